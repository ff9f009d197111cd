//! Error types for syncgate runs.
//!
//! Every variant here is fatal for the run: the binary maps them to exit
//! status `2`. Per-command problems are never errors; they are either soft
//! diagnostics (see [`crate::schema::Diagnostic`]) or violations (see
//! [`crate::engine::Violation`]).

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::Diagnostic;

/// Upper bound on the diagnostics carried by [`SyncError::NoDescriptors`].
pub const DIAGNOSTIC_SAMPLE_LIMIT: usize = 15;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A required input (schema source or native entry point) does not exist.
    #[error("missing {role}: {}", .path.display())]
    MissingInput { role: &'static str, path: PathBuf },

    #[error("failed to read file: {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory: {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema walk finished without a single resolvable command.
    #[error(
        "failed to extract command definitions from {}; diagnostics:\n{}",
        .path.display(),
        render_diagnostics(.diagnostics)
    )]
    NoDescriptors {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("invalid layout: {0}")]
    Layout(String),

    #[error("scan task failed: {0}")]
    Task(String),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "(no specific syntax diagnostics)".to_string();
    }
    diagnostics
        .iter()
        .take(DIAGNOSTIC_SAMPLE_LIMIT)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
