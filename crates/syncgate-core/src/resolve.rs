//! Mapping a command name to the handler file(s) that implement it.
//!
//! The naming convention is tried first (`manage_water` ->
//! `McpAutomationBridge_WaterHandlers.cpp`); when no file carries that name,
//! every handler file mentioning the command is returned. Neither strategy is
//! authoritative. An empty result is the `unresolvable` condition.

use regex::RegexBuilder;

use crate::error::SyncError;
use crate::layout::ResolverLayout;
use crate::native::HandlerIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Convention,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Repository-relative paths, sorted.
    pub files: Vec<String>,
    pub strategy: Strategy,
}

#[derive(Debug, Clone)]
pub struct HandlerResolver {
    layout: ResolverLayout,
}

impl HandlerResolver {
    pub fn new(layout: ResolverLayout) -> Self {
        Self { layout }
    }

    /// File name the naming convention predicts for `command`.
    pub fn expected_file_name(&self, command: &str) -> String {
        let stem = command
            .strip_prefix(self.layout.strip_prefix.as_str())
            .unwrap_or(command);
        let mut chars = stem.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!(
            "{}{capitalized}{}",
            self.layout.file_prefix, self.layout.file_suffix
        )
    }

    pub fn resolve(&self, command: &str, handlers: &HandlerIndex) -> Result<Resolution, SyncError> {
        let expected = self.expected_file_name(command);
        if let Some(direct) = handlers.values().find(|file| file.file_name() == expected) {
            return Ok(Resolution {
                files: vec![direct.path.clone()],
                strategy: Strategy::Convention,
            });
        }

        let dispatch_re = RegexBuilder::new(&format!(
            r"\bHandle\w*\(.*\b{}\b",
            regex::escape(command)
        ))
        .case_insensitive(true)
        .build()
        .map_err(|err| SyncError::Layout(format!("failed compiling dispatch regex: {err}")))?;

        let files = handlers
            .values()
            .filter(|file| file.text.contains(command) || dispatch_re.is_match(&file.text))
            .map(|file| file.path.clone())
            .collect();
        Ok(Resolution {
            files,
            strategy: Strategy::Search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{HandlerFile, ImplementedActionSet};

    fn index(files: &[(&str, &str)]) -> HandlerIndex {
        files
            .iter()
            .map(|(path, text)| {
                (
                    path.to_string(),
                    HandlerFile {
                        path: path.to_string(),
                        text: text.to_string(),
                        actions: ImplementedActionSet::new(),
                    },
                )
            })
            .collect()
    }

    fn resolver() -> HandlerResolver {
        HandlerResolver::new(ResolverLayout::default())
    }

    #[test]
    fn expected_name_strips_prefix_and_capitalizes_first_letter() {
        let resolver = resolver();
        assert_eq!(
            resolver.expected_file_name("manage_water"),
            "McpAutomationBridge_WaterHandlers.cpp"
        );
        assert_eq!(
            resolver.expected_file_name("manage_post_process"),
            "McpAutomationBridge_Post_processHandlers.cpp"
        );
        assert_eq!(
            resolver.expected_file_name("control_actor"),
            "McpAutomationBridge_Control_actorHandlers.cpp"
        );
    }

    #[test]
    fn convention_match_wins_over_search() {
        let handlers = index(&[
            ("p/McpAutomationBridge_WaterHandlers.cpp", "// water"),
            ("p/McpAutomationBridge_MiscHandlers.cpp", "manage_water is mentioned"),
        ]);
        let resolution = resolver()
            .resolve("manage_water", &handlers)
            .expect("resolution should not fail");
        assert_eq!(resolution.strategy, Strategy::Convention);
        assert_eq!(resolution.files, vec!["p/McpAutomationBridge_WaterHandlers.cpp"]);
    }

    #[test]
    fn search_returns_every_mentioning_file() {
        let handlers = index(&[
            ("p/A_Handlers.cpp", "if (Tool == TEXT(\"control_actor\"))"),
            ("p/B_Handlers.cpp", "HandleControlActorRequest(Request, Control_Actor)"),
            ("p/C_Handlers.cpp", "nothing relevant"),
        ]);
        let resolution = resolver()
            .resolve("control_actor", &handlers)
            .expect("resolution should not fail");
        assert_eq!(resolution.strategy, Strategy::Search);
        assert_eq!(resolution.files, vec!["p/A_Handlers.cpp", "p/B_Handlers.cpp"]);
    }

    #[test]
    fn nothing_found_is_empty() {
        let handlers = index(&[("p/A_Handlers.cpp", "nothing")]);
        let resolution = resolver()
            .resolve("manage_ghost", &handlers)
            .expect("resolution should not fail");
        assert!(resolution.files.is_empty());
    }
}
