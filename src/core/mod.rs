// src/core/mod.rs
//! Process-wide services created once at startup

pub mod config_manager;
pub mod fs_ops;

pub use config_manager::{ConfigManager, GeminiConfig, ServerSettings};
pub use fs_ops::FsOps;
