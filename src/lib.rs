//! # Quiz Autofill
//!
//! 把 LLM 提取出的题目逐题录入第三方网页表单（Summernote 富文本编辑器）
//!
//! ## 架构设计
//!
//! 本系统采用四层架构，外加一层跨世界桥接：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page、状态文件），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供主世界 / 隔离世界两种 eval
//! - `StateStore` - 跨刷新保存题目列表和进度（后写覆盖先写）
//! - `Clock` / `poll_until` - 可替换的等待与轮询
//!
//! ### 桥接（Bridge）
//! - `bridge/` - 隔离世界只能通过 DOM 事件通知页面主世界
//! - `Dispatcher` - 隔离世界一侧，只发不收
//! - 接收端脚本 - 主世界一侧，调用页面自己的 jQuery / Summernote
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `HostPage` - 目标页面上的具名查找（按钮、下拉框、答案控件）
//! - `ExtractionService` - LLM 提取题目
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整录入流程
//! - `QuestionFlow` - 打开表单 → 题型 → 写入 → 答案 → 保存
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/resume_controller` - 每次页面加载后决定续跑 / 等待 / 空闲
//! - `orchestrator/app` - 页面循环与用户命令
//!
//! ## 模块结构

pub mod bridge;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{JsExecutor, StateStore};
pub use models::{LoopState, Question, QuestionType};
pub use orchestrator::{App, ResumeController};
pub use workflow::{ProcessResult, QuestionCtx, QuestionFlow};
