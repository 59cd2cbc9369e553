pub mod controller;
pub mod poller;
pub mod state;

pub use controller::PollingEngine;
pub use state::{EngineState, EngineStatus};
