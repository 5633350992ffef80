//! HTTP client for the program endpoints of the streaming backend.

mod client;
mod error;
mod wire;

pub use client::{
    CSRF_HEADER, ClientBuilder, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProgramClient,
};
pub use error::{BackendHttpError, Result};
pub use wire::{
    ApplyProgramRequest, PlatformOption, ProgramRecord, StreamRecord, VideoRecord, Workspace,
};
