//! Error types for the handbook builder.
//!
//! Library crates use [`HandbookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Longest excerpt of offending HTML kept in an [`HandbookError::UnsupportedMarkup`].
const CONTEXT_LIMIT: usize = 240;

/// Top-level error type for all handbook operations.
#[derive(Debug, thiserror::Error)]
pub enum HandbookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// The fetched page did not have the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The renderer met a tag it has no LaTeX mapping for.
    #[error("unsupported markup <{tag}> in: {context}")]
    UnsupportedMarkup { tag: String, context: String },

    /// The external typesetter failed.
    #[error("compile error: {0}")]
    Compile(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HandbookError>;

impl HandbookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an unsupported-markup error. The context is cut down to a
    /// readable excerpt on a char boundary.
    pub fn unsupported(tag: impl Into<String>, context: &str) -> Self {
        let context = match context.char_indices().nth(CONTEXT_LIMIT) {
            Some((idx, _)) => format!("{}...", &context[..idx]),
            None => context.to_string(),
        };
        Self::UnsupportedMarkup {
            tag: tag.into(),
            context,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a missing tag mapping (as opposed to a network
    /// or I/O failure).
    pub fn is_unsupported_markup(&self) -> bool {
        matches!(self, Self::UnsupportedMarkup { .. })
    }
}
