//! Syncgate core: does the declared command surface match native dispatch?
//!
//! A command platform describes its callable surface twice: as a declarative
//! schema (command names, each with an enumerated set of sub-actions) and as
//! native handler code branching on the sub-action string. This crate reads
//! both as text and reports where they disagree.
//!
//! Pipeline:
//!
//! - [`schema`]: command descriptors from the exported command table.
//! - [`native`]: registered command names and per-file implemented actions.
//! - [`resolve`]: command name -> handler file(s).
//! - [`engine`]: the consistency pass producing a [`RunResult`].
//! - [`report`]: text/JSON rendering and exit status.
//!
//! [`load`] performs all file I/O up front; nothing after it touches the
//! filesystem.

pub mod engine;
pub mod error;
pub mod layout;
pub mod load;
pub mod native;
pub mod report;
pub mod resolve;
pub mod schema;

pub use engine::{
    CheckInputs, RunResult, Violation, ViolationDetails, ViolationKind, check,
};
pub use error::SyncError;
pub use layout::Layout;
pub use load::{Inputs, load_inputs};
pub use native::{HandlerFile, HandlerIndex, ImplementedActionSet, NativeIdioms, RegistrationSet};
pub use report::{EXIT_FATAL, EXIT_OK, EXIT_VIOLATIONS, exit_status, render_json, render_text};
pub use resolve::HandlerResolver;
pub use schema::{CommandDescriptor, Diagnostic, Extraction, extract_command_table};

use std::path::Path;

/// Load every input under `repo_root` and run the consistency pass.
pub async fn verify(
    repo_root: &Path,
    layout: &Layout,
    filter: Option<&str>,
) -> Result<RunResult, SyncError> {
    let inputs = load_inputs(repo_root, layout).await?;
    let resolver = HandlerResolver::new(layout.resolver.clone());
    check(
        &CheckInputs {
            descriptors: &inputs.extraction.descriptors,
            registrations: &inputs.registrations,
            handlers: &inputs.handlers,
            resolver: &resolver,
        },
        filter,
    )
}
