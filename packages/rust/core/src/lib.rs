//! Handbook assembly for the handbook builder.
//!
//! Ties together the outline, page fetching and LaTeX rendering into one
//! `.tex` document (`build_handbook`), and optionally typesets it.

pub mod compile;
pub mod document;
pub mod pipeline;

pub use compile::compile;
pub use pipeline::{BuildOptions, BuildReport, ProgressReporter, SilentProgress, build_handbook};
