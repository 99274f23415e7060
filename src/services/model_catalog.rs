//! 可用模型列表
//!
//! 直接请求 Gemini 的 `models` 接口，只保留支持 `generateContent` 的模型。

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, ExtractionError};

/// 默认优先选择的模型
pub const PREFERRED_MODEL: &str = "gemini-1.5-flash";

/// 一个可用模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// 去掉 `models/` 前缀后的名称，可直接用于请求
    pub name: String,
    pub display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// 从接口返回中筛出可生成内容的模型
pub fn parse_model_list(body: &JsonValue) -> Result<Vec<ModelInfo>, ExtractionError> {
    if let Some(message) = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(ExtractionError::ModelListFailed {
            message: message.to_string(),
        });
    }

    let raw_models = body
        .get("models")
        .and_then(|m| m.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(raw_models
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RawModel>(v).ok())
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .map(|m| {
            let name = m.name.replacen("models/", "", 1);
            ModelInfo {
                display_name: m.display_name.unwrap_or_else(|| m.name.clone()),
                name,
            }
        })
        .collect())
}

/// 默认模型：列表里有 gemini-1.5-flash 就用它，否则用第一个
pub fn preferred_default(models: &[ModelInfo]) -> Option<&str> {
    models
        .iter()
        .find(|m| m.name.contains(PREFERRED_MODEL))
        .map(|_| PREFERRED_MODEL)
        .or_else(|| models.first().map(|m| m.name.as_str()))
}

/// 模型列表客户端
pub struct ModelCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ModelCatalog {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.models_api_base_url.clone(),
            api_key: config.llm_api_key.clone(),
        }
    }

    pub async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        debug!("请求模型列表: {}", url);

        let body: JsonValue = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| model_list_failed(e.to_string()))?
            .json()
            .await
            .map_err(|e| model_list_failed(e.to_string()))?;

        Ok(parse_model_list(&body).map_err(AppError::from)?)
    }
}

fn model_list_failed(message: String) -> AppError {
    ExtractionError::ModelListFailed { message }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_body() -> JsonValue {
        json!({
            "models": [
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-1.5-pro", "displayName": "Gemini 1.5 Pro",
                 "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/gemini-1.5-flash", "displayName": "Gemini 1.5 Flash",
                 "supportedGenerationMethods": ["generateContent"]}
            ]
        })
    }

    #[test]
    fn test_only_generation_models_are_kept() {
        let models = parse_model_list(&sample_body()).unwrap();
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["gemini-1.5-pro", "gemini-1.5-flash"]);
        assert_eq!(models[0].display_name, "Gemini 1.5 Pro");
    }

    #[test]
    fn test_preferred_default() {
        let models = parse_model_list(&sample_body()).unwrap();
        assert_eq!(preferred_default(&models), Some("gemini-1.5-flash"));
        assert_eq!(preferred_default(&models[..1]), Some("gemini-1.5-pro"));
        assert_eq!(preferred_default(&[]), None);
    }

    #[test]
    fn test_api_error_is_reported() {
        let err = parse_model_list(&json!({"error": {"message": "API key not valid"}})).unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }
}
