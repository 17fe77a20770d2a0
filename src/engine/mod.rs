//! Response engine module - dispatch, lifecycle and events

mod event_bus;
mod executor;
mod lifecycle;

pub use event_bus::{EngineEvent, EventBus, EventKind, EventPayload};
pub use executor::{ExecutionError, ResponseEngine};
pub use lifecycle::{InitError, LifecycleManager, LifecycleStage};
