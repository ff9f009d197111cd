//! Repository layout: where the inputs live and which idioms name things.
//!
//! Defaults describe the automation-bridge plugin layout. A repository can
//! override any key from a `syncgate.toml` at its root, or from an explicit
//! `--config` file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

pub const DEFAULT_CONFIG_FILE: &str = "syncgate.toml";

const PLUGIN_PRIVATE_DIR: &str = "plugins/McpAutomationBridge/Source/McpAutomationBridge/Private";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub schema: SchemaLayout,
    pub native: NativeLayout,
    pub resolver: ResolverLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaLayout {
    /// Declarative schema source, relative to the repository root.
    pub path: String,
    /// Exported binding holding the command table.
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeLayout {
    /// Source file registering command names against handlers.
    pub entry_point: String,
    pub handlers_dir: String,
    /// Handler files have this substring in their name...
    pub handler_marker: String,
    /// ...and this extension.
    pub handler_extension: String,
    /// `RegisterHandler(TEXT("name"), ...)`
    pub register_call: String,
    /// `if (LowerSub == TEXT("action"))`
    pub action_variable: String,
    /// Wrapper around string literals in native source; empty for bare literals.
    pub literal_macro: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverLayout {
    pub strip_prefix: String,
    pub file_prefix: String,
    pub file_suffix: String,
}

impl Default for SchemaLayout {
    fn default() -> Self {
        Self {
            path: "src/tools/consolidated-tool-definitions.ts".to_string(),
            table: "consolidatedToolDefinitions".to_string(),
        }
    }
}

impl Default for NativeLayout {
    fn default() -> Self {
        Self {
            entry_point: format!("{PLUGIN_PRIVATE_DIR}/McpAutomationBridgeSubsystem.cpp"),
            handlers_dir: PLUGIN_PRIVATE_DIR.to_string(),
            handler_marker: "Handlers".to_string(),
            handler_extension: ".cpp".to_string(),
            register_call: "RegisterHandler".to_string(),
            action_variable: "LowerSub".to_string(),
            literal_macro: "TEXT".to_string(),
        }
    }
}

impl Default for ResolverLayout {
    fn default() -> Self {
        Self {
            strip_prefix: "manage_".to_string(),
            file_prefix: "McpAutomationBridge_".to_string(),
            file_suffix: "Handlers.cpp".to_string(),
        }
    }
}

impl Layout {
    pub fn from_toml_str(raw: &str) -> Result<Self, SyncError> {
        let layout: Layout =
            toml::from_str(raw).map_err(|err| SyncError::Layout(err.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Resolve the layout for `repo_root`: an explicit config must exist; the
    /// implicit `syncgate.toml` is optional.
    pub fn load(repo_root: &Path, config: Option<&Path>) -> Result<Self, SyncError> {
        let path = match config {
            Some(explicit) => {
                let path = if explicit.is_absolute() {
                    explicit.to_path_buf()
                } else {
                    repo_root.join(explicit)
                };
                if !path.exists() {
                    return Err(SyncError::MissingInput {
                        role: "layout config",
                        path,
                    });
                }
                path
            }
            None => {
                let implicit = repo_root.join(DEFAULT_CONFIG_FILE);
                if !implicit.exists() {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE}; using default layout");
                    return Ok(Self::default());
                }
                implicit
            }
        };

        let raw = fs::read_to_string(&path).map_err(|source| SyncError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let layout: Layout = toml::from_str(&raw)
            .map_err(|err| SyncError::Layout(format!("{}: {err}", path.display())))?;
        layout.validate()?;
        tracing::debug!(config = %path.display(), "loaded layout config");
        Ok(layout)
    }

    pub fn schema_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.schema.path)
    }

    pub fn entry_point_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.native.entry_point)
    }

    pub fn handlers_dir(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.native.handlers_dir)
    }

    /// Handler discovery filter: marker substring plus extension.
    pub fn is_handler_file_name(&self, file_name: &str) -> bool {
        file_name.contains(&self.native.handler_marker)
            && file_name.ends_with(&self.native.handler_extension)
    }

    fn validate(&self) -> Result<(), SyncError> {
        let required = [
            ("schema.path", &self.schema.path),
            ("schema.table", &self.schema.table),
            ("native.entry_point", &self.native.entry_point),
            ("native.handlers_dir", &self.native.handlers_dir),
            ("native.register_call", &self.native.register_call),
            ("native.action_variable", &self.native.action_variable),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Layout(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let layout = Layout::from_toml_str("").expect("empty config should parse");
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn partial_config_overrides_only_named_keys() {
        let layout = Layout::from_toml_str(
            r#"
[schema]
path = "schema/commands.ts"

[native]
literal_macro = ""
"#,
        )
        .expect("partial config should parse");
        assert_eq!(layout.schema.path, "schema/commands.ts");
        assert_eq!(layout.schema.table, "consolidatedToolDefinitions");
        assert_eq!(layout.native.literal_macro, "");
        assert_eq!(layout.native.register_call, "RegisterHandler");
        assert_eq!(layout.resolver, ResolverLayout::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Layout::from_toml_str("[native]\nregister = \"X\"\n")
            .expect_err("typo should be rejected");
        assert!(matches!(err, SyncError::Layout(_)));
    }

    #[test]
    fn empty_required_identifier_is_rejected() {
        let err = Layout::from_toml_str("[native]\naction_variable = \" \"\n")
            .expect_err("blank identifier should be rejected");
        assert!(err.to_string().contains("native.action_variable"));
    }

    #[test]
    fn handler_file_filter_needs_marker_and_extension() {
        let layout = Layout::default();
        assert!(layout.is_handler_file_name("McpAutomationBridge_WaterHandlers.cpp"));
        assert!(!layout.is_handler_file_name("McpAutomationBridge_WaterHandlers.h"));
        assert!(!layout.is_handler_file_name("McpAutomationBridgeSubsystem.cpp"));
    }
}
