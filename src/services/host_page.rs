//! 目标页面能力 - 业务能力层
//!
//! 把第三方页面上的每一次启发式查找包装成一个具名操作。
//! 流程层只依赖这里的 trait，测试时可以换成假页面。

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::EventLoadEventFired;
use chromiumoxide::listeners::EventStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::bridge::{install_bridge_receiver, PageSignalChannel};
use crate::infrastructure::JsExecutor;
use crate::services::page_scripts;

/// 题型下拉框中的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// 用户在浮层上点击的按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Start,
    Stop,
    Clear,
}

impl UserCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// 录入表单上的具名查找
///
/// 查找不到元素时返回 `false` / 0，不算错误；只有页面通信失败才返回 Err。
#[async_trait]
pub trait HostPage: Send + Sync {
    /// 点击 "Add Question"，返回是否找到
    async fn click_add_question(&self) -> Result<bool>;
    /// 题型下拉框的选项（找不到下拉框时为空）
    async fn type_options(&self) -> Result<Vec<SelectOption>>;
    /// 当前可见的富文本编辑器数量
    async fn count_editors(&self) -> Result<usize>;
    /// 直接给分值输入框赋值，返回是否找到
    async fn set_points(&self, points: &str) -> Result<bool>;
    /// 正确答案控件数量
    async fn answer_control_count(&self) -> Result<usize>;
    /// 点击第 `index` 个正确答案控件
    async fn click_answer_control(&self, index: usize) -> Result<bool>;
    /// 点击保存按钮（不等待结果），返回是否找到
    async fn click_save(&self) -> Result<bool>;
}

/// 页面级控制：刷新、浮层、用户命令
#[async_trait]
pub trait PageControl: Send + Sync {
    /// 与页面的连接是否仍然可用
    async fn is_connected(&self) -> bool;
    /// 强制刷新
    async fn reload(&self) -> Result<()>;
    /// 等待页面下一次完成加载（页面自己刷新时返回）
    async fn wait_for_reload(&self) -> Result<()>;
    async fn show_running(&self, position: usize, total: usize) -> Result<()>;
    async fn show_idle(&self, pending: usize) -> Result<()>;
    /// 取出用户最近一次点击（取出后清除）
    async fn take_user_command(&self) -> Result<Option<UserCommand>>;
    /// 阻塞提示后刷新
    async fn alert_then_reload(&self, message: &str) -> Result<()>;
}

/// 状态文字显示
#[async_trait]
pub trait StatusDisplay: Send + Sync {
    /// 显示失败只记日志
    async fn show_status(&self, text: &str);
}

/// 基于 Chrome 页面的实现
pub struct ChromeHostPage {
    executor: Arc<JsExecutor>,
    channel: PageSignalChannel,
    load_events: Mutex<Option<EventStream<EventLoadEventFired>>>,
}

impl ChromeHostPage {
    /// 接管页面并安装桥接接收端
    pub async fn attach(executor: Arc<JsExecutor>) -> Result<Self> {
        install_bridge_receiver(&executor).await?;
        Ok(Self {
            channel: PageSignalChannel::new(Arc::clone(&executor)),
            executor,
            load_events: Mutex::new(None),
        })
    }

    /// 广播桥接动作用的通道
    pub fn channel(&self) -> &PageSignalChannel {
        &self.channel
    }

    /// 每次页面加载后调用：新建隔离世界，订阅下一次 load 事件
    pub async fn prepare(&self) -> Result<()> {
        self.executor.forget_isolated_world().await;
        self.executor
            .open_isolated_world()
            .await
            .context("创建隔离世界失败")?;

        let stream = self.executor.load_events().await?;
        *self.load_events.lock().await = Some(stream);

        self.executor.eval_isolated(page_scripts::MARK_ATTACHED_JS).await?;
        debug!("页面已接管");
        Ok(())
    }
}

#[async_trait]
impl HostPage for ChromeHostPage {
    async fn click_add_question(&self) -> Result<bool> {
        self.executor
            .eval_isolated_as(page_scripts::CLICK_ADD_QUESTION_JS)
            .await
    }

    async fn type_options(&self) -> Result<Vec<SelectOption>> {
        self.executor
            .eval_isolated_as(page_scripts::TYPE_OPTIONS_JS)
            .await
    }

    async fn count_editors(&self) -> Result<usize> {
        self.executor
            .eval_isolated_as(page_scripts::count_editors_script())
            .await
    }

    async fn set_points(&self, points: &str) -> Result<bool> {
        self.executor
            .eval_isolated_as(page_scripts::set_points_script(points))
            .await
    }

    async fn answer_control_count(&self) -> Result<usize> {
        self.executor
            .eval_isolated_as(page_scripts::answer_control_count_script())
            .await
    }

    async fn click_answer_control(&self, index: usize) -> Result<bool> {
        self.executor
            .eval_isolated_as(page_scripts::click_answer_control_script(index))
            .await
    }

    async fn click_save(&self) -> Result<bool> {
        self.executor
            .eval_isolated_as(page_scripts::CLICK_SAVE_JS)
            .await
    }
}

#[async_trait]
impl PageControl for ChromeHostPage {
    async fn is_connected(&self) -> bool {
        match self.executor.eval("1").await {
            Ok(_) => true,
            Err(e) => {
                warn!("页面连接检查失败: {}", e);
                false
            }
        }
    }

    async fn reload(&self) -> Result<()> {
        info!("🔄 刷新页面");
        self.executor.reload().await.context("刷新页面失败")
    }

    async fn wait_for_reload(&self) -> Result<()> {
        let mut guard = self.load_events.lock().await;
        if guard.is_none() {
            *guard = Some(self.executor.load_events().await?);
        }
        if let Some(stream) = guard.as_mut() {
            stream.next().await;
        }
        self.executor.forget_isolated_world().await;
        Ok(())
    }

    async fn show_running(&self, position: usize, total: usize) -> Result<()> {
        self.executor
            .eval_isolated(page_scripts::show_running_script(position, total))
            .await?;
        Ok(())
    }

    async fn show_idle(&self, pending: usize) -> Result<()> {
        self.executor
            .eval_isolated(page_scripts::show_idle_script(pending))
            .await?;
        Ok(())
    }

    async fn take_user_command(&self) -> Result<Option<UserCommand>> {
        let raw: String = self
            .executor
            .eval_isolated_as(page_scripts::take_command_script())
            .await?;
        Ok(UserCommand::parse(&raw))
    }

    async fn alert_then_reload(&self, message: &str) -> Result<()> {
        self.executor
            .eval_isolated(page_scripts::alert_then_reload_script(message))
            .await?;
        self.executor.forget_isolated_world().await;
        Ok(())
    }
}

#[async_trait]
impl StatusDisplay for ChromeHostPage {
    async fn show_status(&self, text: &str) {
        if let Err(e) = self
            .executor
            .eval_isolated(page_scripts::set_status_script(text))
            .await
        {
            error!("更新状态文字失败: {}", e);
        }
    }
}
