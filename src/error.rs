use thiserror::Error;

/// 应用程序错误类型
///
/// 业务流程内部统一用 `anyhow::Result`，这里只收录调用方需要区分处理的错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 持久化状态错误
    #[error("状态存储错误: {0}")]
    Store(#[from] StoreError),
    /// 题目提取（LLM）错误
    #[error("题目提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面没有主框架（通常是页面正在关闭）
    #[error("页面没有可用的主框架")]
    NoMainFrame,
    /// 构造 CDP 参数失败
    #[error("CDP 参数无效: {0}")]
    InvalidParams(String),
}

/// 持久化状态错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取状态文件失败
    #[error("读取状态文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入状态文件失败
    #[error("写入状态文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 状态文件内容不是 JSON 对象
    #[error("状态文件已损坏 ({path}): {reason}")]
    Corrupt { path: String, reason: String },
}

/// 题目提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 没有提供任何试卷内容
    #[error("请提供试卷文件或文本内容")]
    MissingInput,
    /// 不支持的附件类型
    #[error("不支持的文件类型: {path}")]
    UnsupportedAttachment { path: String },
    /// 模型调用失败
    #[error("LLM API 调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 模型没有返回内容（可能被拦截）
    #[error("模型没有生成内容 (模型: {model})，可能被拦截或调用失败")]
    NoContent { model: String },
    /// 返回文本不是合法 JSON
    #[error("模型返回的 JSON 无法解析: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    /// 模型列表接口返回错误
    #[error("模型列表接口错误: {message}")]
    ModelListFailed { message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("配置文件 {path} 读取失败: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
