//! Shared types, error model, and configuration for cvscreen.
//!
//! This crate is the foundation depended on by all other cvscreen crates.
//! It provides:
//! - [`ScreenError`]: the unified error type
//! - Domain types ([`CandidateProfile`], [`StructuredResult`], [`ToolName`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GithubConfig, SearchConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, ScreenError};
pub use types::{ApplicationStatus, CandidateProfile, RunId, StructuredResult, ToolName};
