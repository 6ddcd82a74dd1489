//! Optional typesetting step: run an external LaTeX compiler on the output.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use handbook_shared::{HandbookError, Result};

/// Passes needed for the table of contents to settle.
const PASSES: usize = 2;

/// Lines of compiler output kept in an error.
const LOG_TAIL_LINES: usize = 20;

/// Compile `tex_path` with `compiler` (e.g. `pdflatex`) in its own directory.
///
/// Returns the path of the produced PDF.
#[instrument(skip_all, fields(tex = %tex_path.display(), compiler = %compiler))]
pub fn compile(tex_path: &Path, compiler: &str) -> Result<PathBuf> {
    let file_name = tex_path
        .file_name()
        .ok_or_else(|| HandbookError::Compile(format!("not a file: {}", tex_path.display())))?;
    let work_dir = tex_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    for pass in 1..=PASSES {
        debug!(pass, "running typesetter");

        let output = Command::new(compiler)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(file_name)
            .current_dir(work_dir)
            .output()
            .map_err(|e| HandbookError::Compile(format!("failed to run {compiler}: {e}")))?;

        if !output.status.success() {
            let log = String::from_utf8_lossy(&output.stdout);
            let tail: Vec<&str> = log.lines().rev().take(LOG_TAIL_LINES).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(HandbookError::Compile(format!(
                "{compiler} exited with status {} on pass {pass}:\n{}",
                output.status.code().unwrap_or(-1),
                tail.join("\n")
            )));
        }
    }

    let pdf = tex_path.with_extension("pdf");
    info!(pdf = %pdf.display(), "typesetting complete");
    Ok(pdf)
}
