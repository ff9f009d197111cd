//! Rendering a [`RunResult`] and deriving the process exit status.

use serde_json::{Value, json};
use std::fmt::Write as _;

use crate::engine::{RunResult, ViolationKind};

pub const CHECK_KIND: &str = "syncgate.handler_sync_check.v1";
pub const REPORT_TAG: &str = "[syncgate]";

pub const EXIT_OK: i32 = 0;
pub const EXIT_VIOLATIONS: i32 = 1;
/// Usage errors and unrecoverable run errors.
pub const EXIT_FATAL: i32 = 2;

const KIND_ORDER: [ViolationKind; 4] = [
    ViolationKind::MissingRegistration,
    ViolationKind::Unresolvable,
    ViolationKind::MissingActions,
    ViolationKind::ExtraActions,
];

pub fn exit_status(result: &RunResult) -> i32 {
    if result.has_blocking() {
        EXIT_VIOLATIONS
    } else {
        EXIT_OK
    }
}

fn verdict(result: &RunResult) -> &'static str {
    if result.has_blocking() {
        "rejected"
    } else {
        "accepted"
    }
}

/// One document with the same shape whether or not anything was found.
pub fn render_json(result: &RunResult) -> Value {
    json!({
        "schema": 1,
        "checkKind": CHECK_KIND,
        "result": verdict(result),
        "checkedCommands": result.checked_commands,
        "violationCount": result.violations.len(),
        "violations": result.violations,
    })
}

/// Line-oriented report, violations grouped by kind, trailing count.
pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();
    let status = if result.has_blocking() { "FAIL" } else { "OK" };
    let _ = writeln!(
        out,
        "{REPORT_TAG} {status} (checkedCommands={}, violations={})",
        result.checked_commands.len(),
        result.violations.len()
    );
    if result.violations.is_empty() {
        return out;
    }

    for kind in KIND_ORDER {
        let group = result
            .violations
            .iter()
            .filter(|violation| violation.kind == kind)
            .collect::<Vec<_>>();
        if group.is_empty() {
            continue;
        }
        let note = if kind.is_blocking() { "" } else { ", informational" };
        let _ = writeln!(out, "\n{} ({}{note}):", kind.as_str(), group.len());
        for violation in group {
            let _ = writeln!(out, "  - {}: {}", violation.command, violation.message);
            let Some(details) = &violation.details else {
                continue;
            };
            if !details.missing.is_empty() {
                let _ = writeln!(out, "      missing: {}", details.missing.join(", "));
            }
            if !details.extra.is_empty() {
                let _ = writeln!(out, "      extra: {}", details.extra.join(", "));
            }
            if !details.searched_files.is_empty() {
                let _ = writeln!(out, "      searched: {}", details.searched_files.join(", "));
            }
            if let Some(expected) = &details.expected_file {
                let _ = writeln!(out, "      expected file: {expected}");
            }
        }
    }
    let _ = writeln!(out, "\nFound {} issue(s).", result.violations.len());
    out
}
