//! Reconciling declared command contracts against native handlers.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SyncError;
use crate::native::{HandlerIndex, ImplementedActionSet, RegistrationSet};
use crate::resolve::HandlerResolver;
use crate::schema::CommandDescriptor;

/// Declaration order is also report order within one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRegistration,
    Unresolvable,
    MissingActions,
    ExtraActions,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRegistration => "missing_registration",
            Self::Unresolvable => "unresolvable",
            Self::MissingActions => "missing_actions",
            Self::ExtraActions => "extra_actions",
        }
    }

    /// Everything but `extra_actions` fails the run.
    pub fn is_blocking(self) -> bool {
        !matches!(self, Self::ExtraActions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationDetails {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub searched_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub command: String,
    pub kind: ViolationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ViolationDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub checked_commands: Vec<String>,
    pub violations: Vec<Violation>,
}

impl RunResult {
    pub fn has_blocking(&self) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.kind.is_blocking())
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.kind == kind)
            .count()
    }
}

/// Everything the engine reads. Built once, before the engine pass.
pub struct CheckInputs<'a> {
    pub descriptors: &'a BTreeMap<String, CommandDescriptor>,
    pub registrations: &'a RegistrationSet,
    pub handlers: &'a HandlerIndex,
    pub resolver: &'a HandlerResolver,
}

/// Check every declared command (or only `filter`), accumulating all
/// violations. Never stops at the first discrepancy.
pub fn check(inputs: &CheckInputs<'_>, filter: Option<&str>) -> Result<RunResult, SyncError> {
    let mut result = RunResult::default();

    for (name, descriptor) in inputs.descriptors {
        if filter.is_some_and(|wanted| wanted != name.as_str()) {
            continue;
        }
        result.checked_commands.push(name.clone());
        check_command(inputs, descriptor, &mut result.violations)?;
    }

    result
        .violations
        .sort_by(|left, right| (&left.command, left.kind).cmp(&(&right.command, right.kind)));
    tracing::debug!(
        checked = result.checked_commands.len(),
        violations = result.violations.len(),
        "consistency pass complete"
    );
    Ok(result)
}

fn check_command(
    inputs: &CheckInputs<'_>,
    descriptor: &CommandDescriptor,
    violations: &mut Vec<Violation>,
) -> Result<(), SyncError> {
    let name = &descriptor.name;

    if !inputs.registrations.contains(name) {
        violations.push(Violation {
            command: name.clone(),
            kind: ViolationKind::MissingRegistration,
            message: format!(
                "command '{name}' is declared in the schema but never registered in the native entry point"
            ),
            details: None,
        });
        return Ok(());
    }

    let resolution = inputs.resolver.resolve(name, inputs.handlers)?;
    tracing::debug!(
        command = %name,
        strategy = ?resolution.strategy,
        files = resolution.files.len(),
        "resolved handler files"
    );
    if resolution.files.is_empty() {
        violations.push(Violation {
            command: name.clone(),
            kind: ViolationKind::Unresolvable,
            message: format!("could not locate a native handler file implementing '{name}'"),
            details: Some(ViolationDetails {
                expected_file: Some(inputs.resolver.expected_file_name(name)),
                ..ViolationDetails::default()
            }),
        });
        return Ok(());
    }

    let implemented: ImplementedActionSet = resolution
        .files
        .iter()
        .filter_map(|path| inputs.handlers.get(path))
        .flat_map(|file| file.actions.iter().cloned())
        .collect();
    let declared: BTreeSet<String> = descriptor
        .declared_actions
        .iter()
        .map(|action| action.to_lowercase())
        .collect();

    let missing = declared.difference(&implemented).cloned().collect::<Vec<_>>();
    let extra = implemented.difference(&declared).cloned().collect::<Vec<_>>();

    if !missing.is_empty() {
        violations.push(Violation {
            command: name.clone(),
            kind: ViolationKind::MissingActions,
            message: format!(
                "command '{name}' declares {} action(s) missing from its native handler(s)",
                missing.len()
            ),
            details: Some(ViolationDetails {
                missing,
                searched_files: resolution.files.clone(),
                ..ViolationDetails::default()
            }),
        });
    }
    if !extra.is_empty() {
        violations.push(Violation {
            command: name.clone(),
            kind: ViolationKind::ExtraActions,
            message: format!(
                "command '{name}' has {} native action(s) not declared in the schema (aliases or dead branches)",
                extra.len()
            ),
            details: Some(ViolationDetails {
                extra,
                searched_files: resolution.files,
                ..ViolationDetails::default()
            }),
        });
    }
    Ok(())
}
