//! 续跑控制器 - 编排层
//!
//! 目标页面每保存一道题就整页刷新，内存状态全部丢失。
//! 进度只保存在 [`StateStore`] 里，每次页面加载后由这里决定：
//! 自动继续下一题、显示开始按钮，或者什么都不做。
//!
//! ```text
//! Idle ──开始──▶ Running(0) ──录入成功──▶ Running(i+1) ──...──▶ Complete(显示为 Idle)
//!   ▲                │
//!   └────停止/重置────┘        录入出错：只显示错误，不写进度
//! ```
//!
//! 录入和等待刷新期间一直轮询浮层上的 STOP / RESET，点击后立即停止。

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::infrastructure::state_store::{
    clear_questions, load_loop_state, load_questions, save_loop_state,
};
use crate::infrastructure::{Clock, StateStore};
use crate::models::{LoopState, Question};
use crate::services::{PageControl, StatusDisplay, UserCommand, WarnWriter};
use crate::workflow::{ProcessResult, QuestionCtx, QuestionFlow};

/// 停止时弹出的提示
pub const STOP_MESSAGE: &str = "Automation Stopped and Reset.";

/// 页面加载后该做什么
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// 自动处理第 i 题
    Resume(usize),
    /// 有题目但未在运行：显示开始按钮（题目总数）
    OfferStart(usize),
    /// 没有题目
    Nothing,
}

/// 根据持久化状态决定下一步
pub fn decide(state: &LoopState, total: usize) -> ResumeDecision {
    if state.has_pending(total) {
        ResumeDecision::Resume(state.current_index)
    } else if total > 0 {
        ResumeDecision::OfferStart(total)
    } else {
        ResumeDecision::Nothing
    }
}

/// 一次页面加载的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoadOutcome {
    /// 已录入并推进进度；`reloaded_by_host` 表示页面是否自己刷新了
    Processed {
        index: usize,
        result: ProcessResult,
        reloaded_by_host: bool,
    },
    /// 录入出错，进度未推进，需要人工处理
    Failed { index: usize, error: String },
    /// 处理过程中用户点击了停止，进度已重置
    Stopped { index: usize },
    /// 等待用户点击开始
    AwaitingStart { pending: usize },
    /// 没有数据
    Idle,
}

/// 续跑控制器
pub struct ResumeController<'a> {
    store: &'a dyn StateStore,
    page: &'a dyn PageControl,
    status: &'a dyn StatusDisplay,
    flow: &'a QuestionFlow<'a>,
    clock: &'a dyn Clock,
    warn_writer: Option<WarnWriter>,
}

impl<'a> ResumeController<'a> {
    pub fn new(
        store: &'a dyn StateStore,
        page: &'a dyn PageControl,
        status: &'a dyn StatusDisplay,
        flow: &'a QuestionFlow<'a>,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            page,
            status,
            flow,
            clock,
            warn_writer: None,
        }
    }

    /// 录入失败的题目同时写入失败记录文件
    pub fn with_warn_writer(mut self, warn_writer: WarnWriter) -> Self {
        self.warn_writer = Some(warn_writer);
        self
    }

    /// 每次页面加载后调用
    pub async fn on_page_load(&self) -> Result<PageLoadOutcome> {
        let questions = load_questions(self.store).await?;
        let state = load_loop_state(self.store).await?;

        match decide(&state, questions.len()) {
            ResumeDecision::Resume(index) => self.resume(&questions, state).await.map(|outcome| {
                if let PageLoadOutcome::Failed { .. } = &outcome {
                    warn!("⚠️ 第 {} 题需要人工处理，可以停止后修正数据再重新开始", index + 1);
                }
                outcome
            }),
            ResumeDecision::OfferStart(pending) => {
                info!("📋 共有 {} 道题目，等待开始", pending);
                self.page.show_idle(pending).await?;
                Ok(PageLoadOutcome::AwaitingStart { pending })
            }
            ResumeDecision::Nothing => Ok(PageLoadOutcome::Idle),
        }
    }

    async fn resume(&self, questions: &[Question], state: LoopState) -> Result<PageLoadOutcome> {
        let index = state.current_index;
        let question = &questions[index];
        let ctx = QuestionCtx::new(index, questions.len(), question);
        let timings = *self.flow.timings();

        self.page.show_running(ctx.position(), ctx.total).await?;

        tokio::select! {
            biased;
            _ = self.wait_for_stop(timings.command_poll) => {
                info!("{} ⏹️ 用户在处理过程中点击了停止", ctx);
                self.stop().await?;
                Ok(PageLoadOutcome::Stopped { index })
            }
            outcome = self.process(question, &ctx, state) => outcome,
        }
    }

    /// 轮询浮层命令，直到用户点击 STOP / RESET
    async fn wait_for_stop(&self, interval: Duration) {
        loop {
            match self.page.take_user_command().await {
                Ok(Some(UserCommand::Stop)) => return,
                Ok(Some(other)) => debug!("运行中忽略命令: {:?}", other),
                Ok(None) => {}
                // 页面正在跳转时读取会失败
                Err(e) => debug!("读取用户命令失败: {}", e),
            }
            self.clock.sleep(interval).await;
        }
    }

    async fn process(
        &self,
        question: &Question,
        ctx: &QuestionCtx,
        state: LoopState,
    ) -> Result<PageLoadOutcome> {
        let index = state.current_index;
        let timings = *self.flow.timings();
        self.clock.sleep(timings.resume_settle).await;

        let result = match self.flow.run(question, ctx, self.status).await {
            Ok(result) => result,
            Err(e) => {
                error!("{} ❌ 录入失败: {:#}", ctx, e);
                self.status.show_status("Error! See log.").await;
                self.record_failure(ctx, question, &format!("{:#}", e));
                return Ok(PageLoadOutcome::Failed {
                    index,
                    error: e.to_string(),
                });
            }
        };

        if result == ProcessResult::SaveMissing {
            self.record_failure(ctx, question, "未找到保存按钮");
        }

        save_loop_state(self.store, state.advanced()).await?;

        // 页面通常会自己刷新；没有刷新时（单页应用）强制刷新
        let reloaded_by_host = tokio::select! {
            biased;
            reloaded = self.page.wait_for_reload() => {
                reloaded?;
                true
            }
            _ = self.clock.sleep(timings.reload_fallback) => false,
        };

        if reloaded_by_host {
            info!("{} ✓ 页面已刷新，继续下一题", ctx);
        } else {
            info!("{} 页面未自动刷新，强制刷新", ctx);
            self.page.reload().await?;
        }

        Ok(PageLoadOutcome::Processed {
            index,
            result,
            reloaded_by_host,
        })
    }

    /// 开始：进度置为 Running(0) 并刷新
    pub async fn start(&self) -> Result<()> {
        if !self.page.is_connected().await {
            warn!("⚠️ 页面连接已失效，刷新页面以恢复");
            return self.page.reload().await;
        }

        match save_loop_state(self.store, LoopState::started()).await {
            Ok(()) => info!("▶️ 开始自动录入"),
            Err(e) => warn!("⚠️ 写入进度失败，刷新页面: {}", e),
        }
        self.page.reload().await
    }

    /// 停止 / 重置：进度置为 Idle(0)，提示后刷新
    pub async fn stop(&self) -> Result<()> {
        save_loop_state(self.store, LoopState::idle()).await?;
        info!("⏹️ 已停止并重置进度");
        self.page.alert_then_reload(STOP_MESSAGE).await
    }

    /// 清除题目数据后刷新
    pub async fn clear_data(&self) -> Result<()> {
        if !self.page.is_connected().await {
            warn!("⚠️ 页面连接已失效，刷新页面以恢复");
            return self.page.reload().await;
        }

        clear_questions(self.store).await?;
        info!("🗑️ 已清除题目数据");
        self.page.reload().await
    }

    fn record_failure(&self, ctx: &QuestionCtx, question: &Question, reason: &str) {
        if let Some(writer) = &self.warn_writer {
            if let Err(e) = writer.write(
                ctx.index,
                question.question_number,
                &question.question_text,
                reason,
            ) {
                error!("写入失败记录失败: {}", e);
            }
        }
    }
}
