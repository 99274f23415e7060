//! 题目处理上下文
//!
//! 封装"我正在处理第几题、一共几题"这一信息

use std::fmt::Display;

use crate::models::Question;

/// 题目处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCtx {
    /// 题目在列表中的位置（从 0 开始）
    pub index: usize,

    /// 题目总数
    pub total: usize,

    /// 题号（来自提取结果，仅用于日志）
    pub question_number: u32,
}

impl QuestionCtx {
    pub fn new(index: usize, total: usize, question: &Question) -> Self {
        Self {
            index,
            total,
            question_number: question.question_number,
        }
    }

    /// 从 1 开始的位置，用于显示
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 {}/{}]", self.position(), self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        let ctx = QuestionCtx::new(0, 12, &Question::default());
        assert_eq!(ctx.to_string(), "[题目 1/12]");
    }
}
