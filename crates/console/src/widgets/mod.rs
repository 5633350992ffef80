pub mod preview;
pub mod targets;
pub mod timeline;
