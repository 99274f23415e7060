use crate::models::question::Question;
use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// 从任意 JSON 值中找出题目数组
///
/// - 数组：直接使用
/// - 对象（例如 LLM 返回的 `{"questions": [...]}`）：取第一个数组类型的字段
/// - 其它：空列表
pub fn recover_question_array(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(map) => {
            for (key, field) in map {
                if let JsonValue::Array(items) = field {
                    debug!("题目数据被包在对象字段 '{}' 中，已自动展开", key);
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// 把 JSON 值解析为题目列表，无法解析的条目会被跳过
pub fn parse_questions(value: JsonValue) -> Vec<Question> {
    recover_question_array(value)
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Question>(item) {
            Ok(question) => Some(question),
            Err(e) => {
                warn!("跳过第 {} 条无法解析的题目: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// 按列表顺序重新编号（从 1 开始）
pub fn renumber(questions: &mut [Question]) {
    for (index, question) in questions.iter_mut().enumerate() {
        question.question_number = (index + 1) as u32;
    }
}

/// 从 JSON 文件加载题目列表
pub async fn load_questions_file(path: &Path) -> Result<Vec<Question>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取题目文件: {}", path.display()))?;

    let value: JsonValue = serde_json::from_str(&content)
        .with_context(|| format!("无法解析题目文件: {}", path.display()))?;

    let mut questions = parse_questions(value);
    renumber(&mut questions);
    Ok(questions)
}
