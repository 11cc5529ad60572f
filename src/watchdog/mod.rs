//! Dead man's switch core: per-device countdowns and the state machine that
//! drives them.
pub mod countdown;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use engine::WatchdogEngine;
pub use error::WatchdogError;
