//! 固定等待时间
//!
//! 页面内部状态更新是异步且不可观测的，这些值都是经验值。

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// 点击 "Add Question" 后等待表单展开
    pub form_settle: Duration,
    /// 编辑器数量轮询间隔
    pub poll_interval: Duration,
    /// 编辑器数量轮询次数
    pub poll_attempts: usize,
    /// 插入配图前的等待
    pub image_settle: Duration,
    /// 题干写完、开始写选项前的等待
    pub options_settle: Duration,
    /// 每个选项写完后的等待
    pub option_settle: Duration,
    /// 页面加载后、开始处理前的等待
    pub resume_settle: Duration,
    /// 保存后等待页面自己刷新的最长时间
    pub reload_fallback: Duration,
    /// 浮层按钮轮询间隔
    pub command_poll: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            form_settle: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(500),
            poll_attempts: 20,
            image_settle: Duration::from_millis(300),
            options_settle: Duration::from_millis(500),
            option_settle: Duration::from_millis(400),
            resume_settle: Duration::from_millis(1000),
            reload_fallback: Duration::from_millis(5000),
            command_poll: Duration::from_millis(500),
        }
    }
}
