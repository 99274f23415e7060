//! 不需要浏览器的命令：状态、导入、提取、模型列表

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::state_store::{
    load_loop_state, load_questions, save_loop_state, save_questions,
};
use crate::infrastructure::StateStore;
use crate::models::{load_questions_file, LoopState, Question};
use crate::services::model_catalog::preferred_default;
use crate::services::{ExtractionRequest, ExtractionService, ModelCatalog};
use crate::utils::truncate_text;

/// 进度概览
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub total: usize,
    pub state: LoopState,
}

impl StatusReport {
    /// 尚未录入的题目数
    pub fn remaining(&self) -> usize {
        if self.state.is_running {
            self.total.saturating_sub(self.state.current_index)
        } else {
            self.total
        }
    }
}

/// 读取进度
pub async fn status(store: &dyn StateStore) -> Result<StatusReport> {
    let questions = load_questions(store).await?;
    let state = load_loop_state(store).await?;

    let report = StatusReport {
        total: questions.len(),
        state,
    };

    info!("📋 题目总数: {}", report.total);
    if state.is_running {
        info!(
            "▶️ 运行中: 下一题 {}/{}（剩余 {}）",
            (state.current_index + 1).min(report.total.max(1)),
            report.total,
            report.remaining()
        );
    } else {
        info!("⏸️ 空闲");
    }
    for (i, q) in questions.iter().enumerate().take(10) {
        info!("  {}. {}", i + 1, truncate_text(&q.question_text, 60));
    }
    if questions.len() > 10 {
        info!("  ... 还有 {} 道", questions.len() - 10);
    }

    Ok(report)
}

/// 保存题目列表，并把进度置为空闲（等待开始）
pub async fn replace_questions(store: &dyn StateStore, questions: &[Question]) -> Result<()> {
    save_questions(store, questions).await?;
    save_loop_state(store, LoopState::idle()).await?;
    Ok(())
}

/// 从 JSON 文件导入题目
pub async fn import(store: &dyn StateStore, file: &Path) -> Result<usize> {
    let questions = load_questions_file(file).await?;
    if questions.is_empty() {
        warn!("⚠️ 文件中没有可用的题目: {}", file.display());
    }
    replace_questions(store, &questions).await?;
    info!("✓ 已导入 {} 道题目，打开录入页面后点击开始", questions.len());
    Ok(questions.len())
}

/// 调用 LLM 提取题目并保存
pub async fn extract(
    config: &Config,
    store: &dyn StateStore,
    request: &ExtractionRequest,
    model: Option<&str>,
) -> Result<usize> {
    let mut service = ExtractionService::new(config);
    if let Some(model) = model {
        service = service.with_model(model);
    }

    let questions = service
        .extract(request)
        .await
        .with_context(|| format!("提取失败 (模型: {})", service.model_name()))?;

    replace_questions(store, &questions).await?;
    info!("✓ 已保存 {} 道题目", questions.len());
    Ok(questions.len())
}

/// 列出可用模型
pub async fn list_models(config: &Config) -> Result<()> {
    let models = ModelCatalog::new(config).fetch_models().await?;
    if models.is_empty() {
        warn!("⚠️ 没有找到可用的模型");
        return Ok(());
    }

    let default = preferred_default(&models);
    for model in &models {
        let marker = if Some(model.name.as_str()) == default { "*" } else { " " };
        info!("{} {} ({})", marker, model.name, model.display_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn test_import_resets_progress() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("questions.json");
        std::fs::write(
            &file,
            r#"{"data": [{"question_number": 7, "question_text": "A"}, {"question_number": 9, "question_text": "B"}]}"#,
        )
        .unwrap();

        let store = MemoryStore::new();
        save_loop_state(&store, LoopState::started().advanced()).await.unwrap();

        assert_eq!(import(&store, &file).await.unwrap(), 2);

        let report = status(&store).await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.state, LoopState::idle());
        assert_eq!(report.remaining(), 2);

        let questions = load_questions(&store).await.unwrap();
        assert_eq!(questions[1].question_number, 2);
    }

    #[test]
    fn test_remaining_while_running() {
        let report = StatusReport {
            total: 5,
            state: LoopState::started().advanced().advanced(),
        };
        assert_eq!(report.remaining(), 3);
    }
}
