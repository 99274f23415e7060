//! 题目提取服务 - 业务能力层
//!
//! 把试卷文件（PDF / 图片 / 文本）交给 LLM，得到结构化的题目列表。
//!
//! ## 技术栈
//! - 使用 `async-openai` 调用兼容 OpenAI 的接口（默认 Gemini 的兼容端点）
//! - 文件以 base64 data URI 附在用户消息中
//!
//! 不做重试、不做流式；返回内容异常时直接报错。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractionError};
use crate::models::{parse_questions, Question};
use crate::utils::strip_code_fence;

/// 固定的解析指令
const PARSER_PROMPT: &str = r#"You are a precise data-extraction parser for Science Olympiad tests.
Your task is to extract questions and answers and convert them into a strict JSON array.
Format: [{"question_number": 1, "question_text": "...", "type": "multiple_choice" | "true_false" | "short_answer", "options": ["A", "B", "C", "D"] or null, "correct_answer": "...", "points": 1, "requires_image": true/false}].

CRITICAL INSTRUCTIONS:
1. Output ONLY minified JSON.
2. "requires_image": Set to true IF the question refers to a diagram, graph, map, or picture present in the document.
3. For "short_answer" questions (FRQs), set "options" to null and put the expected answer rubric or expected text in "correct_answer".
4. If an answer key is provided, use it."#;

/// 一次提取请求
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// 试卷文件
    pub document: Option<PathBuf>,
    /// 答案文件
    pub answer_key: Option<PathBuf>,
    /// 额外说明，或者直接粘贴的试卷文本
    pub extra_text: Option<String>,
}

impl ExtractionRequest {
    fn extra_text(&self) -> Option<&str> {
        self.extra_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// 附件内容
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// 二进制文件，以 data URI 发送
    DataUri(String),
    /// 纯文本文件，直接作为文本发送
    Text(String),
}

/// 按扩展名判断 MIME 类型；`None` 表示按纯文本处理
fn mime_for(path: &Path) -> Result<Option<&'static str>, ExtractionError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => Ok(Some("application/pdf")),
        "png" => Ok(Some("image/png")),
        "jpg" | "jpeg" => Ok(Some("image/jpeg")),
        "webp" => Ok(Some("image/webp")),
        "gif" => Ok(Some("image/gif")),
        "txt" | "md" | "csv" => Ok(None),
        _ => Err(ExtractionError::UnsupportedAttachment {
            path: path.display().to_string(),
        }),
    }
}

/// 读取附件
pub async fn read_attachment(path: &Path) -> Result<Attachment> {
    let mime = mime_for(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("读取文件失败: {}", path.display()))?;

    Ok(match mime {
        Some(mime) => Attachment::DataUri(format!("data:{};base64,{}", mime, STANDARD.encode(bytes))),
        None => Attachment::Text(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

/// 拼接解析指令
pub fn build_prompt(extra_text: Option<&str>) -> String {
    match extra_text {
        Some(extra) => format!("{}\n\nAdditional Instructions/Context:\n{}", PARSER_PROMPT, extra),
        None => PARSER_PROMPT.to_string(),
    }
}

/// 解析模型返回的文本
///
/// 去掉代码块标记后按 JSON 解析；对象包裹的数组也能取出
pub fn parse_extraction_response(text: &str) -> AppResult<Vec<Question>> {
    let cleaned = strip_code_fence(text);
    let value = serde_json::from_str(&cleaned)
        .map_err(|source| ExtractionError::InvalidJson { source })?;
    Ok(parse_questions(value))
}

/// 题目提取服务
///
/// 职责：
/// - 组装提示词和附件
/// - 调用 LLM 并解析 JSON
/// - 不写存储，不碰页面
pub struct ExtractionService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl ExtractionService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 指定模型（覆盖配置中的默认值）
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 提取题目
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Vec<Question>> {
        if request.document.is_none() && request.extra_text().is_none() {
            return Err(AppError::from(ExtractionError::MissingInput).into());
        }

        let mut parts = vec![text_part(build_prompt(request.extra_text()))];
        for path in [&request.document, &request.answer_key].into_iter().flatten() {
            debug!("附加文件: {}", path.display());
            parts.push(match read_attachment(path).await? {
                Attachment::DataUri(url) => image_part(url),
                Attachment::Text(text) => text_part(text),
            });
        }

        info!("🤖 正在使用 {} 解析试卷...", self.model_name);
        let text = self.complete(parts).await?;
        let questions = parse_extraction_response(&text)?;
        info!("✓ 解析完成，共 {} 道题目", questions.len());
        Ok(questions)
    }

    async fn complete(&self, parts: Vec<ChatCompletionRequestUserMessageContentPart>) -> Result<String> {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.1)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ExtractionError::ApiCallFailed {
                model: self.model_name.clone(),
                message: e.to_string(),
            }
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ExtractionError::NoContent {
                model: self.model_name.clone(),
            })?;

        Ok(content)
    }
}

fn text_part(text: String) -> ChatCompletionRequestUserMessageContentPart {
    ChatCompletionRequestUserMessageContentPart::Text(ChatCompletionRequestMessageContentPartText {
        text,
    })
}

fn image_part(url: String) -> ChatCompletionRequestUserMessageContentPart {
    ChatCompletionRequestUserMessageContentPart::ImageUrl(
        ChatCompletionRequestMessageContentPartImage {
            image_url: ImageUrl {
                url,
                detail: Some(ImageDetail::High),
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    #[test]
    fn test_prompt_appends_extra_context() {
        let prompt = build_prompt(Some("Only parse section B"));
        assert!(prompt.starts_with("You are a precise data-extraction parser"));
        assert!(prompt.ends_with("Additional Instructions/Context:\nOnly parse section B"));
        assert_eq!(build_prompt(None), PARSER_PROMPT);
    }

    #[test]
    fn test_parse_fenced_response() {
        let text = "```json\n[{\"question_number\":1,\"question_text\":\"What is ATP?\",\"type\":\"multiple_choice\",\"options\":[\"A. Energy\",\"B. Water\"],\"correct_answer\":\"A\",\"points\":1,\"requires_image\":false},{\"question_number\":2,\"question_text\":\"Explain osmosis\",\"type\":\"short_answer\",\"options\":null,\"correct_answer\":\"Water moves\",\"points\":3,\"requires_image\":false}]\n```";
        let questions = parse_extraction_response(text).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].option_count(), 2);
        assert_eq!(questions[1].question_type, QuestionType::ShortAnswer);
        assert_eq!(questions[1].points, 3.0);
    }

    #[test]
    fn test_parse_wrapped_response() {
        let questions = parse_extraction_response(r#"{"questions":[{"question_text":"Q"}]}"#).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_extraction_response("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, AppError::Extraction(ExtractionError::InvalidJson { .. })));
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(mime_for(Path::new("test.PDF")).unwrap(), Some("application/pdf"));
        assert_eq!(mime_for(Path::new("key.jpeg")).unwrap(), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("notes.txt")).unwrap(), None);
        assert!(mime_for(Path::new("test.docx")).is_err());
    }

    #[tokio::test]
    async fn test_read_attachment_encodes_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let attachment = read_attachment(&path).await.unwrap();
        assert_eq!(attachment, Attachment::DataUri("data:image/png;base64,iVBORw==".to_string()));
    }

    #[tokio::test]
    async fn test_missing_input_is_rejected_before_any_call() {
        let service = ExtractionService::new(&Config::default());
        let err = service.extract(&ExtractionRequest::default()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Extraction(ExtractionError::MissingInput))
        ));
    }
}
