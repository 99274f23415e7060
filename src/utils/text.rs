//! 文本清洗工具
//!
//! LLM 提取出的题干 / 选项经常带有 "A." "B)" 这样的序号和结尾逗号，
//! 录入前需要去掉，否则页面上会出现重复的选项字母。

use std::sync::OnceLock;

use regex::Regex;

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[A-Z][.):]\s*").expect("label regex is valid"))
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?").expect("fence regex is valid"))
}

/// 清洗题干 / 选项文本
///
/// 去掉首尾空白、开头的 "A." / "A)" / "A:" 标签以及结尾逗号。
/// 反复处理直到结果不再变化，因此对已清洗的文本再次调用结果不变。
pub fn clean_text(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let mut next = label_regex().replace(&current, "").into_owned();
        if let Some(stripped) = next.strip_suffix(',') {
            next = stripped.to_string();
        }
        let next = next.trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// 去掉 LLM 返回内容中的 ```json / ``` 代码块标记
pub fn strip_code_fence(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// 转义 HTML 属性值
pub fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_labels() {
        assert_eq!(clean_text("B) Paris"), "Paris");
        assert_eq!(clean_text("  a. mitochondria "), "mitochondria");
        assert_eq!(clean_text("D:Nucleus"), "Nucleus");
        assert_eq!(clean_text("Paris"), "Paris");
    }

    #[test]
    fn test_clean_text_strips_trailing_comma_after_label() {
        assert_eq!(clean_text("C: Rome,"), "Rome");
        assert_eq!(clean_text("Rome ,"), "Rome");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let samples = [
            "B) Paris",
            "C: Rome,",
            "A. B) stacked labels,,",
            "",
            "   ",
            "What is 2 + 2?",
            "x,",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "sample: {:?}", sample);
        }
    }

    #[test]
    fn test_clean_text_strips_every_leading_label() {
        // 为了保证幂等，连续的字母标签会全部去掉，包括正文开头的罗马数字
        assert_eq!(clean_text("A. I. and II."), "and II.");
        assert_eq!(clean_text("B) I only"), "I only");
    }

    #[test]
    fn test_clean_text_keeps_inner_punctuation() {
        assert_eq!(clean_text("Which is larger, 3 or 4?"), "Which is larger, 3 or 4?");
        // 单个字母没有标点，不是标签
        assert_eq!(clean_text("C"), "C");
    }

    #[test]
    fn test_strip_code_fence() {
        let raw = "```json\n[{\"question_number\":1}]\n```";
        assert_eq!(strip_code_fence(raw), "[{\"question_number\":1}]");
        assert_eq!(strip_code_fence("  [] "), "[]");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("a\"b<c>&"), "a&quot;b&lt;c&gt;&amp;");
    }
}
