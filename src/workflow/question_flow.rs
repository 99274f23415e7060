//! 题目录入流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整录入流程
//!
//! 流程顺序（严格串行）：
//! 1. 点击 Add Question → 等待表单展开
//! 2. 切换题型（经桥接）
//! 3. 轮询等待编辑器出现
//! 4. 写入题干、配图、选项（经桥接）
//! 5. 填写分值
//! 6. 选择正确答案
//! 7. 点击保存（不等待结果）

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::bridge::{BridgeAction, Dispatcher, SignalChannel};
use crate::infrastructure::{poll_until, Clock};
use crate::models::{Question, QuestionType};
use crate::services::{HostPage, StatusDisplay};
use crate::utils::logging::log_question_start;
use crate::utils::text::escape_attribute;
use crate::utils::{clean_text, truncate_text};
use crate::workflow::answer::{pick_multiple_choice_value, resolve_answer_index};
use crate::workflow::question_ctx::QuestionCtx;
use crate::workflow::timings::Timings;

/// 题目录入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已点击保存
    Submitted,
    /// 所有步骤已执行，但没找到保存按钮
    SaveMissing,
}

/// 题目录入流程
///
/// - 只依赖页面能力（HostPage）和派发器
/// - 不读写进度
/// - 元素缺失只记日志并跳过该步骤
pub struct QuestionFlow<'a> {
    page: &'a dyn HostPage,
    dispatcher: Dispatcher<'a>,
    clock: &'a dyn Clock,
    timings: Timings,
}

impl<'a> QuestionFlow<'a> {
    pub fn new(
        page: &'a dyn HostPage,
        channel: &'a dyn SignalChannel,
        clock: &'a dyn Clock,
        timings: Timings,
    ) -> Self {
        Self {
            page,
            dispatcher: Dispatcher::new(channel),
            clock,
            timings,
        }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub async fn run(
        &self,
        question: &Question,
        ctx: &QuestionCtx,
        status: &dyn StatusDisplay,
    ) -> Result<ProcessResult> {
        log_question_start(
            ctx.position(),
            ctx.total,
            &truncate_text(&question.question_text, 50),
        );
        debug!("{} 题号 Q{}", ctx, question.question_number);

        // ========== 1. 打开新题目表单 ==========
        if self.page.click_add_question().await? {
            debug!("{} 已点击 Add Question", ctx);
            self.clock.sleep(self.timings.form_settle).await;
        } else {
            warn!("{} ⚠️ 未找到 Add Question 按钮，直接使用当前表单", ctx);
        }

        // ========== 2. 切换题型 ==========
        let type_options = self.page.type_options().await?;
        let type_value = pick_multiple_choice_value(&type_options);
        debug!("{} 题型值: {}", ctx, type_value);
        self.dispatcher
            .send(&BridgeAction::change_type(type_value))
            .await?;

        // ========== 3. 等待编辑器 ==========
        let required = 1 + question.option_count();
        if !self.wait_for_editors(required).await? {
            warn!(
                "{} ⚠️ 需要 {} 个编辑器，但未全部出现，继续录入",
                ctx, required
            );
        }

        // ========== 4. 写入题干 / 配图 / 选项 ==========
        self.inject(0, clean_text(&question.question_text)).await?;

        if let Some(image) = question.image() {
            self.clock.sleep(self.timings.image_settle).await;
            let img_html = format!(
                r#"<br><img src="{}" style="max-width: 100%; margin-top: 10px;">"#,
                escape_attribute(image)
            );
            self.inject(0, img_html).await?;
            debug!("{} 已插入配图", ctx);
        }

        self.clock.sleep(self.timings.options_settle).await;

        for (i, option) in question.options().iter().enumerate() {
            self.inject(i + 1, clean_text(option)).await?;
            self.clock.sleep(self.timings.option_settle).await;
        }

        // ========== 5. 分值 ==========
        if !self.page.set_points(&question.points_text()).await? {
            debug!("{} 未找到分值输入框", ctx);
        }

        // ========== 6. 正确答案 ==========
        self.select_correct_answer(question, ctx).await?;

        // ========== 7. 保存 ==========
        if self.page.click_save().await? {
            status.show_status("Saving...").await;
            info!("{} 💾 已点击保存", ctx);
            Ok(ProcessResult::Submitted)
        } else {
            error!("{} ❌ 未找到保存按钮", ctx);
            Ok(ProcessResult::SaveMissing)
        }
    }

    async fn inject(&self, index: usize, content: String) -> Result<()> {
        self.dispatcher
            .send(&BridgeAction::inject(index, content))
            .await
    }

    /// 轮询编辑器数量，达到 `required` 返回 true
    async fn wait_for_editors(&self, required: usize) -> Result<bool> {
        let page = self.page;
        let dispatcher = &self.dispatcher;

        poll_until(
            self.clock,
            self.timings.poll_attempts,
            self.timings.poll_interval,
            move |_| async move {
                dispatcher.send(&BridgeAction::Scan).await?;
                Ok(page.count_editors().await? >= required)
            },
        )
        .await
    }

    async fn select_correct_answer(&self, question: &Question, ctx: &QuestionCtx) -> Result<()> {
        if question.question_type == QuestionType::ShortAnswer || question.option_count() == 0 {
            return Ok(());
        }
        let Some(answer) = question.correct_answer.as_deref() else {
            return Ok(());
        };

        let control_count = self.page.answer_control_count().await?;
        if control_count == 0 {
            warn!("{} ⚠️ 未找到正确答案控件", ctx);
            return Ok(());
        }

        match resolve_answer_index(answer, question.options()) {
            Some(index) if index < control_count => {
                self.page.click_answer_control(index).await?;
                debug!("{} 已选择正确答案: 第 {} 项", ctx, index + 1);
            }
            Some(index) => {
                warn!(
                    "{} ⚠️ 正确答案下标 {} 超出控件数量 {}",
                    ctx, index, control_count
                );
            }
            None => {
                warn!("{} ⚠️ 无法匹配正确答案: {}", ctx, answer);
            }
        }
        Ok(())
    }
}
