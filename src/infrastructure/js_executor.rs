//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力。
//!
//! 页面里有两个脚本世界：
//! - 主世界：第三方页面自己的 JS（jQuery、Summernote）所在的环境
//! - 隔离世界：本程序通过 CDP 创建的独立环境，与页面共享 DOM，但看不到页面的 JS 对象
//!
//! 查找元素、派发信号都在隔离世界里执行；只有桥接接收端和需要页面 JS 的操作在主世界。

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CreateIsolatedWorldParams, EventLoadEventFired,
};
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, ExecutionContextId};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::BrowserError;

/// 隔离世界名称
pub const ISOLATED_WORLD_NAME: &str = "quiz_autofill";

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露主世界 / 隔离世界两种 eval 能力
/// - 不认识 Question
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
    isolated_world: RwLock<Option<ExecutionContextId>>,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self {
            page,
            isolated_world: RwLock::new(None),
        }
    }

    /// 在页面主世界执行 JS 代码并返回 JSON 结果
    ///
    /// 返回 `undefined` / `null` 时得到 `JsonValue::Null`
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    /// 为当前文档创建新的隔离世界
    ///
    /// 页面刷新后旧的执行上下文失效，每次页面加载后都要重新调用
    pub async fn open_isolated_world(&self) -> Result<ExecutionContextId> {
        let frame_id = self
            .page
            .mainframe()
            .await?
            .ok_or(BrowserError::NoMainFrame)?;

        let params = CreateIsolatedWorldParams::builder()
            .frame_id(frame_id)
            .world_name(ISOLATED_WORLD_NAME)
            .build()
            .map_err(BrowserError::InvalidParams)?;

        let response = self.page.execute(params).await?;
        let context_id = response.result.execution_context_id;
        debug!("已创建隔离世界: {:?}", context_id);

        *self.isolated_world.write().await = Some(context_id);
        Ok(context_id)
    }

    /// 在隔离世界执行 JS 代码
    ///
    /// 代码可以返回 Promise，会等待其完成
    pub async fn eval_isolated(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let current = *self.isolated_world.read().await;
        let context_id = match current {
            Some(id) => id,
            None => self.open_isolated_world().await?,
        };

        let params = EvaluateParams::builder()
            .expression(js_code.into())
            .context_id(context_id)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(BrowserError::InvalidParams)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .context("隔离世界脚本执行失败")?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    /// 在隔离世界执行 JS 代码并反序列化为指定类型
    pub async fn eval_isolated_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T> {
        let json_value = self.eval_isolated(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 注册在每个新文档（包括刷新后）加载前执行的主世界脚本
    pub async fn add_init_script(&self, script: impl Into<String>) -> Result<()> {
        let params = AddScriptToEvaluateOnNewDocumentParams::new(script.into());
        self.page.execute(params).await?;
        Ok(())
    }

    /// 订阅页面 load 事件
    pub async fn load_events(&self) -> Result<EventStream<EventLoadEventFired>> {
        Ok(self.page.event_listener::<EventLoadEventFired>().await?)
    }

    /// 刷新页面并等待导航完成
    pub async fn reload(&self) -> Result<()> {
        self.forget_isolated_world().await;
        self.page.reload().await?;
        Ok(())
    }

    /// 页面已刷新，旧的隔离世界不可再用
    pub async fn forget_isolated_world(&self) {
        *self.isolated_world.write().await = None;
    }
}
