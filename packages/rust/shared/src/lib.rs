//! Shared types, error model, and configuration for the handbook builder.
//!
//! This crate is the foundation depended on by all other handbook crates.
//! It provides:
//! - [`HandbookError`]: the unified error type
//! - Outline types ([`Outline`], [`Chapter`], [`Section`], [`ContentSelector`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DocumentConfig, FetchConfig, OutputConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{HandbookError, Result};
pub use types::{Chapter, ContentSelector, Outline, Section};
