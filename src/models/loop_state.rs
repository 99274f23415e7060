use serde::{Deserialize, Serialize};

/// 自动录入进度
///
/// 页面每次保存后都会整页刷新，进度必须持久化才能在刷新后继续。
/// 不变量：`current_index <= 题目总数`；`is_running == false` 表示空闲。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub current_index: usize,
}

impl LoopState {
    /// 空闲 / 已重置
    pub fn idle() -> Self {
        Self::default()
    }

    /// 用户点击开始后的初始状态
    pub fn started() -> Self {
        Self {
            is_running: true,
            current_index: 0,
        }
    }

    /// 当前题目处理完成后的状态
    pub fn advanced(self) -> Self {
        Self {
            is_running: true,
            current_index: self.current_index + 1,
        }
    }

    /// 是否还有未处理的题目需要自动继续
    pub fn has_pending(&self, total: usize) -> bool {
        self.is_running && self.current_index < total
    }
}
