//! Native source scanning: registrations in the entry point and sub-action
//! branches in handler files.
//!
//! Both scanners are whole-file pattern searches, not parses. A literal that
//! only appears in a comment still counts, so implemented sets over-approximate.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SyncError;
use crate::layout::NativeLayout;

/// Command names registered against a handler in the native entry point.
pub type RegistrationSet = BTreeSet<String>;

/// Lower-cased sub-action identifiers recognized by one handler file.
pub type ImplementedActionSet = BTreeSet<String>;

/// Handler files keyed by repository-relative, forward-slash path.
pub type HandlerIndex = BTreeMap<String, HandlerFile>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFile {
    pub path: String,
    pub text: String,
    pub actions: ImplementedActionSet,
}

impl HandlerFile {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Compiled scanner patterns for one [`NativeLayout`].
#[derive(Debug, Clone)]
pub struct NativeIdioms {
    register: Regex,
    compare: Regex,
    case_label: Regex,
}

impl NativeIdioms {
    pub fn new(layout: &NativeLayout) -> Result<Self, SyncError> {
        let name_literal = wrap_literal(&layout.literal_macro, r#""([A-Za-z0-9_-]+)""#);
        let action_literal = wrap_literal(&layout.literal_macro, r#""([^"]+)""#);

        let register = compile(
            "registration",
            &format!(
                r"\b{}\s*\(\s*{name_literal}",
                regex::escape(&layout.register_call)
            ),
        )?;
        let compare = compile(
            "action comparison",
            &format!(
                r"\b{}\s*==\s*{action_literal}",
                regex::escape(&layout.action_variable)
            ),
        )?;
        let case_label = compile("case label", &format!(r"\bcase\s+{action_literal}\s*:"))?;

        Ok(Self {
            register,
            compare,
            case_label,
        })
    }

    pub fn registered_commands(&self, entry_point_text: &str) -> RegistrationSet {
        self.register
            .captures_iter(entry_point_text)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Union of the comparison idiom and the `case` label idiom.
    pub fn implemented_actions(&self, handler_text: &str) -> ImplementedActionSet {
        self.compare
            .captures_iter(handler_text)
            .chain(self.case_label.captures_iter(handler_text))
            .filter_map(|caps| caps.get(1))
            .map(|action| action.as_str().to_lowercase())
            .collect()
    }
}

fn wrap_literal(literal_macro: &str, quoted: &str) -> String {
    if literal_macro.is_empty() {
        quoted.to_string()
    } else {
        format!(r"{}\(\s*{quoted}\s*\)", regex::escape(literal_macro))
    }
}

fn compile(label: &str, pattern: &str) -> Result<Regex, SyncError> {
    Regex::new(pattern)
        .map_err(|err| SyncError::Layout(format!("failed compiling {label} regex: {err}")))
}
