use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use syncgate_core::report::REPORT_TAG;
use syncgate_core::{EXIT_FATAL, Layout, exit_status, render_json, render_text};

use crate::cli::OutputFormat;

pub struct Args {
    pub tool: Option<String>,
    pub format: OutputFormat,
    pub repo_root: String,
    pub config: Option<String>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{REPORT_TAG} ERROR: {message}");
    process::exit(EXIT_FATAL);
}

pub fn run(args: Args) {
    let repo_root = PathBuf::from(&args.repo_root);
    let config = args.config.as_deref().map(Path::new);
    let layout = Layout::load(&repo_root, config).unwrap_or_else(|err| fail(err));
    tracing::debug!(
        repo_root = %repo_root.display(),
        tool = args.tool.as_deref().unwrap_or("*"),
        "starting verify"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|err| fail(format!("failed to create tokio runtime: {err}")));

    let result = runtime
        .block_on(syncgate_core::verify(
            &repo_root,
            &layout,
            args.tool.as_deref(),
        ))
        .unwrap_or_else(|err| fail(err));

    match args.format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&render_json(&result))
                .unwrap_or_else(|err| fail(format!("failed to render report: {err}")));
            println!("{rendered}");
        }
        OutputFormat::Text => print!("{}", render_text(&result)),
    }

    let _ = std::io::stdout().flush();
    process::exit(exit_status(&result));
}
