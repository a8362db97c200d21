//! Shared types, error model, and configuration for ReportForge.
//!
//! This crate is the foundation depended on by all other ReportForge crates.
//! It provides:
//! - [`ReportForgeError`] — the unified error type
//! - Domain types ([`RemoteFile`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchPoliciesConfig, OpenRouterConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ReportForgeError, Result};
pub use types::{RemoteFile, RunId};
