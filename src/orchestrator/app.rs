//! 应用主循环 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、连接浏览器、接管页面、安装桥接
//! 2. **页面循环**：每次页面加载后交给 [`ResumeController`] 决定下一步
//! 3. **用户命令**：轮询浮层按钮（开始 / 停止 / 清除）
//! 4. **资源管理**：唯一持有 Browser 和页面
//!
//! ```text
//! ┌─▶ prepare（新隔离世界）
//! │     ↓
//! │   on_page_load ──Processed / Stopped──┐
//! │     ↓ 其它                             │
//! │   等待用户命令 / 页面刷新                │
//! └───────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{debug, info};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{JsExecutor, JsonFileStore, TokioClock};
use crate::orchestrator::resume_controller::{PageLoadOutcome, ResumeController};
use crate::services::{ChromeHostPage, PageControl, UserCommand, WarnWriter};
use crate::utils::logging::{init_log_file, log_startup};
use crate::workflow::{QuestionFlow, Timings};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    page: ChromeHostPage,
    store: JsonFileStore,
    clock: TokioClock,
    timings: Timings,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config.target_url, config.browser_debug_port);

        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            &config.target_url,
            config.target_title.as_deref(),
        )
        .await?;

        let executor = Arc::new(JsExecutor::new(page));
        let page = ChromeHostPage::attach(executor).await?;
        let store = JsonFileStore::new(&config.state_file);
        info!("💾 状态文件: {}", store.path().display());

        Ok(Self {
            config,
            _browser: browser,
            page,
            store,
            clock: TokioClock,
            timings: Timings::default(),
        })
    }

    fn flow(&self) -> QuestionFlow<'_> {
        QuestionFlow::new(&self.page, self.page.channel(), &self.clock, self.timings)
    }

    fn controller<'a>(&'a self, flow: &'a QuestionFlow<'a>) -> ResumeController<'a> {
        ResumeController::new(&self.store, &self.page, &self.page, flow, &self.clock)
            .with_warn_writer(WarnWriter::with_path(&self.config.warn_file))
    }

    /// 运行页面循环，直到 Ctrl+C
    pub async fn run(&self) -> Result<()> {
        info!("👀 开始监听页面（Ctrl+C 退出）");

        loop {
            self.page.prepare().await?;

            let flow = self.flow();
            let controller = self.controller(&flow);

            let outcome = tokio::select! {
                outcome = controller.on_page_load() => outcome?,
                _ = tokio::signal::ctrl_c() => {
                    info!("收到退出信号，程序结束");
                    return Ok(());
                }
            };
            debug!("页面处理结果: {:?}", outcome);

            match outcome {
                PageLoadOutcome::Processed { .. } => continue,
                PageLoadOutcome::Stopped { .. } => {
                    // 提示框关闭后页面才会刷新
                    if !self.wait_for_reload_or_exit().await? {
                        info!("收到退出信号，程序结束");
                        return Ok(());
                    }
                    continue;
                }
                _ => {}
            }

            if !self.wait_for_user(&controller).await? {
                info!("收到退出信号，程序结束");
                return Ok(());
            }
        }
    }

    /// 等待用户点击浮层按钮或页面刷新；收到 Ctrl+C 返回 false
    async fn wait_for_user(&self, controller: &ResumeController<'_>) -> Result<bool> {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => return Ok(false),
                reloaded = self.page.wait_for_reload() => {
                    reloaded?;
                    debug!("检测到页面刷新");
                    return Ok(true);
                }
                _ = tokio::time::sleep(self.timings.command_poll) => {}
            }

            match self.page.take_user_command().await {
                Ok(Some(command)) => {
                    self.handle_command(controller, command).await?;
                    return Ok(true);
                }
                Ok(None) => {}
                // 页面正在跳转时读取会失败，下一轮再试
                Err(e) => debug!("读取用户命令失败: {}", e),
            }
        }
    }

    async fn handle_command(
        &self,
        controller: &ResumeController<'_>,
        command: UserCommand,
    ) -> Result<()> {
        info!("🖱️ 用户命令: {:?}", command);
        match command {
            UserCommand::Start => controller.start().await,
            UserCommand::Clear => controller.clear_data().await,
            UserCommand::Stop => {
                controller.stop().await?;
                // 提示框关闭后页面才会刷新
                self.wait_for_reload_or_exit().await.map(|_| ())
            }
        }
    }

    /// 等待页面刷新；收到 Ctrl+C 返回 false
    async fn wait_for_reload_or_exit(&self) -> Result<bool> {
        tokio::select! {
            reloaded = self.page.wait_for_reload() => reloaded.map(|_| true),
            _ = tokio::signal::ctrl_c() => Ok(false),
        }
    }

    /// 执行一次性命令（开始 / 停止 / 清除），不进入页面循环
    pub async fn execute(&self, command: UserCommand) -> Result<()> {
        self.page.prepare().await?;
        let flow = self.flow();
        let controller = self.controller(&flow);

        match command {
            UserCommand::Start => controller.start().await,
            UserCommand::Stop => controller.stop().await,
            UserCommand::Clear => controller.clear_data().await,
        }
    }
}
