//! 正确答案与题型选择

use std::sync::OnceLock;

use regex::Regex;

use crate::services::SelectOption;
use crate::utils::clean_text;

/// 找不到 "Multiple Choice" 选项时使用的题型值
pub const FALLBACK_TYPE_VALUE: &str = "3";

fn letter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[A-F]$").expect("letter regex is valid"))
}

/// 把正确答案解析为选项下标（从 0 开始）
///
/// - 单个字母 A-F（不区分大小写）直接映射为 0-5
/// - 否则把清洗后的答案与清洗后的选项做不区分大小写的完全匹配
pub fn resolve_answer_index(correct_answer: &str, options: &[String]) -> Option<usize> {
    if letter_regex().is_match(correct_answer) {
        let letter = correct_answer.to_ascii_uppercase().as_bytes()[0];
        return Some((letter - b'A') as usize);
    }

    let wanted = clean_text(correct_answer).to_lowercase();
    options
        .iter()
        .position(|option| clean_text(option).to_lowercase() == wanted)
}

/// 从题型下拉框选项中找出 "multiple choice" / "multiple answers" 的值
pub fn pick_multiple_choice_value(options: &[SelectOption]) -> String {
    options
        .iter()
        .find(|opt| {
            let text = opt.text.to_lowercase();
            text.contains("multiple choice") || text.contains("multiple answers")
        })
        .map(|opt| opt.value.clone())
        .unwrap_or_else(|| FALLBACK_TYPE_VALUE.to_string())
}
