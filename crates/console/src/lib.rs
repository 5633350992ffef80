//! Operator-facing layer of the program editor: configuration, the session
//! task and UI view models.

pub mod app;
pub mod bridge;
pub mod config;
pub mod widgets;

pub use app::{AppState, Message};
pub use bridge::{BridgeError, Request, SessionHandle, spawn_session};
pub use config::{ConfigError, ConsoleConfig};
