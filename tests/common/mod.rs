//! 测试用的假页面、假通道和不睡眠的时钟

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use quiz_autofill::bridge::{BridgeAction, Signal, SignalChannel};
use quiz_autofill::infrastructure::Clock;
use quiz_autofill::models::{Question, QuestionType};
use quiz_autofill::services::{HostPage, PageControl, SelectOption, StatusDisplay, UserCommand};

/// 页面上发生的可观察操作
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    AddQuestion,
    SetPoints(String),
    ClickAnswer(usize),
    Save,
    Reload,
    ShowRunning(usize, usize),
    ShowIdle(usize),
    Status(String),
    Alert(String),
}

/// 脚本化的假页面
pub struct FakePage {
    pub type_options: Vec<SelectOption>,
    /// 每次计数依次返回；用完后重复最后一个值
    pub editor_counts: Mutex<VecDeque<usize>>,
    pub last_editor_count: Mutex<usize>,
    pub answer_controls: usize,
    pub has_save: bool,
    /// 保存后页面是否自己刷新
    pub host_reloads: bool,
    pub connected: bool,
    /// 读取题型下拉框时抛错
    pub fail_type_lookup: bool,
    pub events: Mutex<Vec<PageEvent>>,
    pub commands: Mutex<VecDeque<UserCommand>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            type_options: vec![
                SelectOption::new("1", "Short Answer"),
                SelectOption::new("3", "Multiple Choice"),
            ],
            editor_counts: Mutex::new(VecDeque::new()),
            last_editor_count: Mutex::new(7),
            answer_controls: 6,
            has_save: true,
            host_reloads: true,
            connected: true,
            fail_type_lookup: false,
            events: Mutex::new(Vec::new()),
            commands: Mutex::new(VecDeque::new()),
        }
    }
}

impl FakePage {
    pub fn with_editor_counts(self, counts: &[usize]) -> Self {
        *self.editor_counts.lock().unwrap() = counts.iter().copied().collect();
        if let Some(last) = counts.last() {
            *self.last_editor_count.lock().unwrap() = *last;
        }
        self
    }

    pub fn push_command(&self, command: UserCommand) {
        self.commands.lock().unwrap().push_back(command);
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take_events(&self) -> Vec<PageEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn count(&self, wanted: &PageEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn answer_clicks(&self) -> Vec<usize> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                PageEvent::ClickAnswer(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PageEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl HostPage for FakePage {
    async fn click_add_question(&self) -> Result<bool> {
        self.record(PageEvent::AddQuestion);
        Ok(true)
    }

    async fn type_options(&self) -> Result<Vec<SelectOption>> {
        if self.fail_type_lookup {
            return Err(anyhow!("Execution context was destroyed"));
        }
        Ok(self.type_options.clone())
    }

    async fn count_editors(&self) -> Result<usize> {
        let next = self.editor_counts.lock().unwrap().pop_front();
        Ok(next.unwrap_or(*self.last_editor_count.lock().unwrap()))
    }

    async fn set_points(&self, points: &str) -> Result<bool> {
        self.record(PageEvent::SetPoints(points.to_string()));
        Ok(true)
    }

    async fn answer_control_count(&self) -> Result<usize> {
        Ok(self.answer_controls)
    }

    async fn click_answer_control(&self, index: usize) -> Result<bool> {
        self.record(PageEvent::ClickAnswer(index));
        Ok(index < self.answer_controls)
    }

    async fn click_save(&self) -> Result<bool> {
        if self.has_save {
            self.record(PageEvent::Save);
        }
        Ok(self.has_save)
    }
}

#[async_trait]
impl PageControl for FakePage {
    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn reload(&self) -> Result<()> {
        self.record(PageEvent::Reload);
        Ok(())
    }

    async fn wait_for_reload(&self) -> Result<()> {
        if self.host_reloads {
            Ok(())
        } else {
            futures::future::pending().await
        }
    }

    async fn show_running(&self, position: usize, total: usize) -> Result<()> {
        self.record(PageEvent::ShowRunning(position, total));
        Ok(())
    }

    async fn show_idle(&self, pending: usize) -> Result<()> {
        self.record(PageEvent::ShowIdle(pending));
        Ok(())
    }

    async fn take_user_command(&self) -> Result<Option<UserCommand>> {
        Ok(self.commands.lock().unwrap().pop_front())
    }

    async fn alert_then_reload(&self, message: &str) -> Result<()> {
        self.record(PageEvent::Alert(message.to_string()));
        self.record(PageEvent::Reload);
        Ok(())
    }
}

#[async_trait]
impl StatusDisplay for FakePage {
    async fn show_status(&self, text: &str) {
        self.record(PageEvent::Status(text.to_string()));
    }
}

/// 记录所有派发动作的通道
#[derive(Default)]
pub struct RecordingChannel {
    actions: Mutex<Vec<BridgeAction>>,
}

impl RecordingChannel {
    pub fn take(&self) -> Vec<BridgeAction> {
        std::mem::take(&mut *self.actions.lock().unwrap())
    }
}

#[async_trait]
impl SignalChannel for RecordingChannel {
    async fn emit(&self, signal: Signal) -> Result<()> {
        let action: BridgeAction = serde_json::from_value(signal.detail)?;
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

/// 不真正睡眠、只记录时长的时钟
#[derive(Default)]
pub struct InstantClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn count(&self, duration: Duration) -> usize {
        self.sleeps().iter().filter(|d| **d == duration).count()
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

// ========== 动作统计 ==========

pub fn change_type_count(actions: &[BridgeAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, BridgeAction::ChangeType { .. }))
        .count()
}

pub fn scan_count(actions: &[BridgeAction]) -> usize {
    actions.iter().filter(|a| matches!(a, BridgeAction::Scan)).count()
}

/// (index, content) of every inject, in order
pub fn injects(actions: &[BridgeAction]) -> Vec<(usize, String)> {
    actions
        .iter()
        .filter_map(|a| match a {
            BridgeAction::Inject { index, content } => Some((*index, content.clone())),
            _ => None,
        })
        .collect()
}

// ========== 题目样例 ==========

pub fn multiple_choice(number: u32, text: &str, options: &[&str], answer: &str) -> Question {
    Question {
        question_number: number,
        question_text: text.to_string(),
        question_type: QuestionType::MultipleChoice,
        options: Some(options.iter().map(|s| s.to_string()).collect()),
        correct_answer: Some(answer.to_string()),
        ..Question::default()
    }
}

pub fn short_answer(number: u32, text: &str, answer: &str) -> Question {
    Question {
        question_number: number,
        question_text: text.to_string(),
        question_type: QuestionType::ShortAnswer,
        options: None,
        correct_answer: Some(answer.to_string()),
        points: 3.0,
        ..Question::default()
    }
}
