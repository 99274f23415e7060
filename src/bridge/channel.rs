//! 信号通道
//!
//! 隔离世界不能直接调用页面主世界的函数，只能通过共享的 DOM 事件目标
//! 广播一个自定义事件。通道是单向的：没有返回值，也没有送达确认。

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::infrastructure::JsExecutor;

/// 自定义事件名称，页面主世界的接收端监听同名事件
pub const SIGNAL_EVENT_NAME: &str = "quiz-autofill-action";

/// 一次广播的信号
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub event: String,
    pub detail: JsonValue,
}

/// 单页面范围内的广播通道
#[async_trait]
pub trait SignalChannel: Send + Sync {
    /// 广播信号，不等待任何回应
    async fn emit(&self, signal: Signal) -> Result<()>;
}

/// 通过真实页面广播：在隔离世界里 `window.dispatchEvent(new CustomEvent(...))`
pub struct PageSignalChannel {
    executor: Arc<JsExecutor>,
}

impl PageSignalChannel {
    pub fn new(executor: Arc<JsExecutor>) -> Self {
        Self { executor }
    }
}

/// 生成派发自定义事件的脚本
///
/// detail 以 JSON 字符串传递，跨世界时不依赖对象克隆
pub fn build_dispatch_script(signal: &Signal) -> Result<String> {
    let event = serde_json::to_string(&signal.event)?;
    let detail = serde_json::to_string(&serde_json::to_string(&signal.detail)?)?;
    Ok(format!(
        "(() => {{ window.dispatchEvent(new CustomEvent({}, {{ detail: {} }})); return true; }})()",
        event, detail
    ))
}

#[async_trait]
impl SignalChannel for PageSignalChannel {
    async fn emit(&self, signal: Signal) -> Result<()> {
        let script = build_dispatch_script(&signal)?;
        self.executor.eval_isolated(script).await?;
        Ok(())
    }
}
