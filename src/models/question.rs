use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize};

/// 题目类型
///
/// 页面上只区分两种：选择题与简答题。LLM 可能给出 `true_false`、
/// `free_response` 等别名，统一归并到这两类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    ShortAnswer,
}

static TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf_map! {
    "multiple_choice" => QuestionType::MultipleChoice,
    "multiple_answers" => QuestionType::MultipleChoice,
    "true_false" => QuestionType::MultipleChoice,
    "short_answer" => QuestionType::ShortAnswer,
    "free_response" => QuestionType::ShortAnswer,
    "essay" => QuestionType::ShortAnswer,
    "frq" => QuestionType::ShortAnswer,
};

impl QuestionType {
    /// 从任意标签解析题目类型，未知标签按选择题处理
    pub fn from_label(label: &str) -> Self {
        let key = label.trim().to_lowercase().replace([' ', '-', '/'], "_");
        TYPE_ALIASES.get(key.as_str()).copied().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Self::from_label(&l)).unwrap_or_default())
    }
}

/// 单道题目（由 LLM 提取、可在编辑步骤中修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "deserialize_number")]
    pub question_number: u32,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub question_text: String,

    #[serde(rename = "type", default)]
    pub question_type: QuestionType,

    #[serde(default)]
    pub options: Option<Vec<String>>,

    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub correct_answer: Option<String>,

    #[serde(default = "default_points", deserialize_with = "deserialize_points")]
    pub points: f64,

    /// data URI 格式的配图
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub requires_image: bool,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            question_number: 0,
            question_text: String::new(),
            question_type: QuestionType::MultipleChoice,
            options: None,
            correct_answer: None,
            points: default_points(),
            image: None,
            requires_image: false,
        }
    }
}

impl Question {
    /// 选项列表（没有选项时为空切片）
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// 选项数量
    pub fn option_count(&self) -> usize {
        self.options().len()
    }

    /// 写入分值输入框的文本，整数分值不带小数点
    pub fn points_text(&self) -> String {
        if self.points.fract() == 0.0 {
            format!("{}", self.points as i64)
        } else {
            self.points.to_string()
        }
    }

    /// 配图（空字符串视为没有）
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|img| !img.trim().is_empty())
    }
}

fn default_points() -> f64 {
    1.0
}

/// 分值可能是数字，也可能是编辑界面里保存下来的字符串
fn deserialize_points<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.as_f64()).unwrap_or_else(default_points))
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .and_then(|s| s.as_f64())
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or(0))
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.unwrap_or_default())
}

/// 答案可能被写成数字或布尔值，统一转成字符串
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|s| s.into_text()))
}

/// JSON 标量的宽松表示
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    fn into_text(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_aliases() {
        assert_eq!(QuestionType::from_label("short_answer"), QuestionType::ShortAnswer);
        assert_eq!(QuestionType::from_label("Free Response"), QuestionType::ShortAnswer);
        assert_eq!(QuestionType::from_label("true_false"), QuestionType::MultipleChoice);
        assert_eq!(QuestionType::from_label("matching"), QuestionType::MultipleChoice);
    }

    #[test]
    fn test_question_from_llm_output() {
        let q: Question = serde_json::from_value(json!({
            "question_number": 3,
            "question_text": "Which organelle produces ATP?",
            "type": "multiple_choice",
            "options": ["A. Nucleus", "B. Mitochondria"],
            "correct_answer": "B",
            "points": 2,
            "requires_image": false
        }))
        .unwrap();

        assert_eq!(q.question_number, 3);
        assert_eq!(q.option_count(), 2);
        assert_eq!(q.correct_answer.as_deref(), Some("B"));
        assert_eq!(q.points_text(), "2");
        assert!(q.image().is_none());
    }

    #[test]
    fn test_question_from_editor_output() {
        // 编辑界面保存的分值是字符串，简答题选项为 null
        let q: Question = serde_json::from_value(json!({
            "question_number": 2,
            "question_text": "Explain osmosis.",
            "image": null,
            "points": "1.5",
            "type": "short_answer",
            "options": null,
            "correct_answer": "Diffusion of water across a membrane"
        }))
        .unwrap();

        assert_eq!(q.question_type, QuestionType::ShortAnswer);
        assert_eq!(q.points, 1.5);
        assert_eq!(q.points_text(), "1.5");
        assert!(q.options().is_empty());
        assert!(!q.requires_image);
    }

    #[test]
    fn test_missing_and_null_fields_use_defaults() {
        let q: Question = serde_json::from_value(json!({
            "question_text": null,
            "type": null,
            "correct_answer": 4,
            "points": "abc"
        }))
        .unwrap();

        assert_eq!(q.question_number, 0);
        assert_eq!(q.question_text, "");
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.correct_answer.as_deref(), Some("4"));
        assert_eq!(q.points, 1.0);
    }
}
