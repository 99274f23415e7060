//! 跨世界桥接
//!
//! 隔离世界（派发器） ──CustomEvent──▶ 页面主世界（接收端）

pub mod action;
pub mod channel;
pub mod dispatcher;
pub mod receiver;

pub use action::BridgeAction;
pub use channel::{PageSignalChannel, Signal, SignalChannel, SIGNAL_EVENT_NAME};
pub use dispatcher::Dispatcher;
pub use receiver::{install_bridge_receiver, BRIDGE_RECEIVER_JS};
