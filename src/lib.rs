//! Documentation and commit message generation from diff content
//!
//! This library resolves which LLM backend applies to a task, dispatches
//! generation through a uniform client interface, and falls back from a
//! failed hosted call to a local model when configured.
pub mod catalog;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod git;
pub mod hooks;
pub mod normalization;
pub mod prompt;
pub mod resolve;
pub mod style;
pub mod templates;
pub mod tokens;

// Re-export commonly used types
pub use config::{GlobalConfig, Provider, TaskKind};
pub use error::{DocGenError, Result};
pub use fallback::{GenerationPath, GenerationResult};
pub use generator::{
   GenerationHandle, create_client, get_device_descriptor, list_available_local_models,
};
pub use resolve::EffectiveConfig;
