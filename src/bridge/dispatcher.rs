use anyhow::Result;
use tracing::debug;

use super::action::BridgeAction;
use super::channel::{Signal, SignalChannel, SIGNAL_EVENT_NAME};

/// 派发器（隔离世界一侧）
///
/// 只负责把 [`BridgeAction`] 广播出去，不知道页面上有没有接收端。
pub struct Dispatcher<'a> {
    channel: &'a dyn SignalChannel,
    event_name: String,
}

impl<'a> Dispatcher<'a> {
    pub fn new(channel: &'a dyn SignalChannel) -> Self {
        Self {
            channel,
            event_name: SIGNAL_EVENT_NAME.to_string(),
        }
    }

    /// 发送一个动作（fire-and-forget）
    pub async fn send(&self, action: &BridgeAction) -> Result<()> {
        debug!("派发桥接动作: {}", action.name());
        let detail = serde_json::to_value(action)?;
        self.channel
            .emit(Signal {
                event: self.event_name.clone(),
                detail,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::channel::local::LocalSignalBus;

    #[tokio::test]
    async fn test_subscribers_see_actions_in_send_order() {
        let bus = LocalSignalBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let dispatcher = Dispatcher::new(&bus);

        let actions = [
            BridgeAction::change_type("3"),
            BridgeAction::Scan,
            BridgeAction::inject(0, "What is ATP?"),
            BridgeAction::inject(1, "Energy"),
        ];
        for action in &actions {
            dispatcher.send(action).await.unwrap();
        }

        for receiver in [&mut first, &mut second] {
            for expected in &actions {
                let signal = receiver.recv().await.unwrap();
                assert_eq!(signal.event, SIGNAL_EVENT_NAME);
                let received: BridgeAction = serde_json::from_value(signal.detail).unwrap();
                assert_eq!(&received, expected);
            }
        }
    }
}
