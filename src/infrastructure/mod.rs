pub mod clock;
pub mod js_executor;
pub mod state_store;

pub use clock::{poll_until, Clock, TokioClock};
pub use js_executor::JsExecutor;
pub use state_store::{JsonFileStore, MemoryStore, StateStore};
