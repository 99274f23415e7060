//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用主循环
//! - 管理应用生命周期（初始化、页面循环）
//! - 持有 Browser 和页面资源
//! - 轮询浮层上的用户命令
//!
//! ### `resume_controller` - 续跑控制器
//! - 每次页面加载后读取持久化进度
//! - 决定自动继续 / 等待开始 / 空闲
//! - 推进进度，必要时强制刷新
//!
//! ### `commands` - 离线命令
//! - 状态、导入、提取、模型列表，不需要浏览器
//!
//! ## 层次关系
//!
//! ```text
//! app (页面循环)
//!     ↓
//! resume_controller (处理一次页面加载)
//!     ↓
//! workflow::QuestionFlow (处理单个 Question)
//!     ↓
//! services / bridge (能力层：页面查找 / 派发)
//!     ↓
//! infrastructure (基础设施：JsExecutor / StateStore / Clock)
//! ```

pub mod app;
pub mod commands;
pub mod resume_controller;

pub use app::App;
pub use resume_controller::{decide, PageLoadOutcome, ResumeController, ResumeDecision};
