use std::path::Path;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "quiz_autofill.toml";

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 出题页面 URL
    pub target_url: String,
    /// 用于匹配已打开标签页的标题片段（可选）
    pub target_title: Option<String>,
    /// 持久化状态文件（题目列表 + 进度）
    pub state_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败题目记录文件
    pub warn_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 模型列表接口（Gemini 原生 API）
    pub models_api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://scilympiad.com/rosecity/Es/TQuestion".to_string(),
            target_title: None,
            state_file: "quiz_autofill_state.json".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            models_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// 读取配置文件（不存在则使用默认值），再叠加环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let base = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                    path: path.display().to_string(),
                    source,
                })?;
            Self::from_toml_str(&content, &path.display().to_string())?
        } else {
            Self::default()
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    /// 解析 TOML 配置内容，缺失字段使用默认值
    pub fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::FileParseFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    /// 用 `lookup` 提供的变量覆盖配置
    pub fn with_overrides<F>(self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            browser_debug_port: parse_var(&lookup, "BROWSER_DEBUG_PORT", "u16")?
                .unwrap_or(self.browser_debug_port),
            target_url: lookup("TARGET_URL").unwrap_or(self.target_url),
            target_title: lookup("TARGET_TITLE").or(self.target_title),
            state_file: lookup("STATE_FILE").unwrap_or(self.state_file),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            warn_file: lookup("WARN_FILE").unwrap_or(self.warn_file),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            models_api_base_url: lookup("MODELS_API_BASE_URL")
                .unwrap_or(self.models_api_base_url),
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, expected_type: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
    }
}
