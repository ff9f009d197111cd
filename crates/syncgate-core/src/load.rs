//! Reading every input the engine needs.
//!
//! The two required files are read one after the other; a missing one aborts
//! the run. Handler files are then read and scanned concurrently, one task per
//! file with no shared mutable state, and merged only after the join. A single
//! unreadable handler file fails the whole run: skipping it would hide
//! missing actions.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::error::SyncError;
use crate::layout::Layout;
use crate::native::{HandlerFile, HandlerIndex, NativeIdioms, RegistrationSet};
use crate::schema::{Extraction, extract_command_table};

#[derive(Debug, Clone)]
pub struct Inputs {
    pub extraction: Extraction,
    pub registrations: RegistrationSet,
    pub handlers: HandlerIndex,
}

/// Repository-relative path with forward slashes, for reports.
pub fn display_path(repo_root: &Path, path: &Path) -> String {
    path.strip_prefix(repo_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Read `path` as text. Invalid UTF-8 is replaced, not rejected.
async fn read_source(path: PathBuf) -> Result<String, SyncError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(source) => Err(SyncError::ReadFile { path, source }),
    }
}

async fn read_required(role: &'static str, path: PathBuf) -> Result<String, SyncError> {
    match tokio::fs::try_exists(&path).await {
        Ok(true) => read_source(path).await,
        Ok(false) => Err(SyncError::MissingInput { role, path }),
        Err(source) => Err(SyncError::ReadFile { path, source }),
    }
}

pub async fn load_inputs(repo_root: &Path, layout: &Layout) -> Result<Inputs, SyncError> {
    let schema_path = layout.schema_path(repo_root);
    let entry_point_path = layout.entry_point_path(repo_root);
    let schema_text = read_required("schema source", schema_path.clone()).await?;
    let entry_point_text = read_required("native entry point", entry_point_path).await?;

    let extraction = extract_command_table(
        &schema_text,
        &display_path(repo_root, &schema_path),
        &layout.schema.table,
    )?;

    let idioms = Arc::new(NativeIdioms::new(&layout.native)?);
    let registrations = idioms.registered_commands(&entry_point_text);
    tracing::debug!(registered = registrations.len(), "scanned native entry point");

    let handler_paths = discover_handler_files(repo_root, layout).await?;
    let handlers = scan_handler_files(repo_root, handler_paths, idioms).await?;

    Ok(Inputs {
        extraction,
        registrations,
        handlers,
    })
}

/// Files in the handler directory passing the marker/extension filter, sorted.
pub async fn discover_handler_files(
    repo_root: &Path,
    layout: &Layout,
) -> Result<Vec<PathBuf>, SyncError> {
    let dir = layout.handlers_dir(repo_root);
    let read_dir_err = |source| SyncError::ReadDir {
        path: dir.clone(),
        source,
    };

    let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_dir_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !layout.is_handler_file_name(name) {
            continue;
        }
        // Follows symlinks; dangling links are left for the scan to report.
        let path = entry.path();
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            paths.push(path);
        }
    }
    paths.sort();
    tracing::debug!(dir = %dir.display(), files = paths.len(), "discovered handler files");
    Ok(paths)
}

/// Fan out one read+scan task per file, then join.
pub async fn scan_handler_files(
    repo_root: &Path,
    paths: Vec<PathBuf>,
    idioms: Arc<NativeIdioms>,
) -> Result<HandlerIndex, SyncError> {
    let mut tasks = JoinSet::new();
    for path in paths {
        let idioms = Arc::clone(&idioms);
        let display = display_path(repo_root, &path);
        tasks.spawn(async move {
            let text = read_source(path).await?;
            let actions = idioms.implemented_actions(&text);
            Ok::<_, SyncError>(HandlerFile {
                path: display,
                text,
                actions,
            })
        });
    }

    let mut handlers = HandlerIndex::new();
    while let Some(joined) = tasks.join_next().await {
        let file = joined.map_err(|err| SyncError::Task(err.to_string()))??;
        tracing::debug!(file = %file.path, actions = file.actions.len(), "scanned handler file");
        handlers.insert(file.path.clone(), file);
    }
    Ok(handlers)
}
