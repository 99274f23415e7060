//! 失败记录服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::utils::truncate_text;

/// 失败记录服务
///
/// 职责：
/// - 把录入失败的题目追加到 warn.txt，方便人工补录
/// - 只处理单个题目
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用默认路径 warn.txt
    pub fn new() -> Self {
        Self::with_path("warn.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `index`: 题目在列表中的位置（从 0 开始）
    /// - `question_number`: 题号
    /// - `question_text`: 题干
    /// - `reason`: 失败原因
    pub fn write(
        &self,
        index: usize,
        question_number: u32,
        question_text: &str,
        reason: &str,
    ) -> Result<()> {
        debug!("写入失败记录: 第 {} 题 -> {}", index + 1, self.warn_file_path);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        let line = format!(
            "[{}] 位置 {} | 题号 {} | 题干: {} | 原因: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            index + 1,
            question_number,
            truncate_text(question_text, 80),
            reason
        );
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
