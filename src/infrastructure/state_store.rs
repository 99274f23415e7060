//! 持久化状态存储 - 基础设施层
//!
//! 题目列表和进度都存放在一个键值存储里，跨页面刷新、跨进程保留。
//! 冲突策略：后写覆盖先写（last-writer-wins），不做事务保护，
//! 只支持同一时间一个标签页在跑录入流程。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{AppResult, StoreError};
use crate::models::{parse_questions, LoopState, Question};

/// 题目列表的存储键
pub const QUESTIONS_KEY: &str = "quizAutofillTestData";
/// 录入进度的存储键
pub const LOOP_STATE_KEY: &str = "quizAutofillLoopState";

/// 键值存储的窄接口
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>>;
    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// 单个 JSON 文件实现的存储
///
/// 每次写入都是"读取 → 修改 → 写临时文件 → 重命名"。
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_map(&self) -> AppResult<Map<String, JsonValue>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.display_path(),
                    source,
                }
                .into())
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<JsonValue>(&content) {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt {
                path: self.display_path(),
                reason: "顶层不是 JSON 对象".to_string(),
            }
            .into()),
            Err(e) => Err(StoreError::Corrupt {
                path: self.display_path(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    async fn write_map(&self, map: &Map<String, JsonValue>) -> AppResult<()> {
        let write_failed = |source| StoreError::WriteFailed {
            path: self.display_path(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        let content = serde_json::to_string_pretty(map).map_err(|e| StoreError::Corrupt {
            path: self.display_path(),
            reason: e.to_string(),
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await.map_err(write_failed)?;
        fs::rename(&tmp_path, &self.path).await.map_err(write_failed)?;
        Ok(())
    }

    async fn update<F>(&self, mutate: F) -> AppResult<()>
    where
        F: FnOnce(&mut Map<String, JsonValue>) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        mutate(&mut map);
        self.write_map(&map).await
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        let mut map = self.read_map().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        debug!("写入状态: {} -> {}", key, self.path.display());
        let key = key.to_string();
        self.update(move |map| {
            map.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let key = key.to_string();
        self.update(move |map| {
            map.remove(&key);
        })
        .await
    }
}

/// 内存存储（测试和一次性运行）
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<Map<String, JsonValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<JsonValue>> {
        Ok(self.map.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> AppResult<()> {
        self.map.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.map.write().await.remove(key);
        Ok(())
    }
}

// ========== 类型化读写 ==========

/// 读取题目列表；缺失、不是数组或被包在对象里都能容忍
pub async fn load_questions(store: &dyn StateStore) -> AppResult<Vec<Question>> {
    match store.get(QUESTIONS_KEY).await? {
        Some(value) => Ok(parse_questions(value)),
        None => Ok(Vec::new()),
    }
}

/// 保存题目列表
pub async fn save_questions(store: &dyn StateStore, questions: &[Question]) -> AppResult<()> {
    let value = serde_json::to_value(questions).map_err(|e| StoreError::Corrupt {
        path: QUESTIONS_KEY.to_string(),
        reason: e.to_string(),
    })?;
    store.set(QUESTIONS_KEY, value).await
}

/// 清除题目列表
pub async fn clear_questions(store: &dyn StateStore) -> AppResult<()> {
    store.remove(QUESTIONS_KEY).await
}

/// 读取录入进度；缺失或格式错误时视为空闲
pub async fn load_loop_state(store: &dyn StateStore) -> AppResult<LoopState> {
    let Some(value) = store.get(LOOP_STATE_KEY).await? else {
        return Ok(LoopState::idle());
    };

    match serde_json::from_value(value) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!("录入进度格式错误，按空闲处理: {}", e);
            Ok(LoopState::idle())
        }
    }
}

/// 保存录入进度
pub async fn save_loop_state(store: &dyn StateStore, state: LoopState) -> AppResult<()> {
    let value = serde_json::to_value(state).map_err(|e| StoreError::Corrupt {
        path: LOOP_STATE_KEY.to_string(),
        reason: e.to_string(),
    })?;
    store.set(LOOP_STATE_KEY, value).await
}
