//! 时钟与轮询
//!
//! 第三方页面没有"编辑器已就绪"之类的事件，只能固定等待或轮询。
//! 所有等待都经过 [`Clock`]，测试时可以替换成不真正睡眠的实现。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// 可注入的时钟
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 的真实时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 轮询直到 `probe` 返回 true 或次数用尽
///
/// 每次探测失败后等待 `interval`。第一次成功立即返回 `Ok(true)`，
/// 不再继续探测；用尽 `attempts` 次返回 `Ok(false)`。
/// `probe` 的参数是从 0 开始的探测序号。
pub async fn poll_until<F, Fut>(
    clock: &dyn Clock,
    attempts: usize,
    interval: Duration,
    mut probe: F,
) -> Result<bool>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 0..attempts {
        if probe(attempt).await? {
            return Ok(true);
        }
        clock.sleep(interval).await;
    }
    Ok(false)
}
