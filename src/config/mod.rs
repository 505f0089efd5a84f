//! Settings loading and management for Ruff Bridge
//!
//! Architecture: Anti-Corruption Layer - Settings translate host-provided YAML into domain values
//! - Raw YAML structures are converted to a clean settings bundle
//! - Defaults mirror the conservative behavior a host expects out of the box
//! - The tool command line is derived here so no other module hardcodes it

use crate::domain::diagnostics::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings bundle consumed from the host's configuration surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Disable the tool's on-disk cache
    ///
    /// Forced on when building the command line: the host feeds ephemeral,
    /// often unsaved buffers, and caching those would litter the filesystem.
    #[serde(default = "default_true")]
    pub no_cache: bool,

    /// Skip linting unless a local configuration file exists in the
    /// working directory
    #[serde(default)]
    pub check_for_local_configuration: bool,

    /// File names that count as local configuration
    #[serde(default = "default_config_file_names")]
    pub config_file_names: Vec<String>,

    /// Host-side scope selector restricting activation to Python buffers
    ///
    /// The host owns activation; this is carried so it can be read back.
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Root of the editor's package-management area, if the host has one
    ///
    /// Passed explicitly rather than read from process-wide state so the
    /// guard is testable without a live host environment.
    #[serde(default)]
    pub packages_root: Option<PathBuf>,

    /// Enable the type-checker interop guard
    ///
    /// The heuristic is tied to a particular project layout, so it can be
    /// switched off without losing the local-configuration guard.
    #[serde(default = "default_true")]
    pub type_comment_guard: bool,
}

impl BridgeSettings {
    /// Load settings from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            BridgeError::config(format!(
                "Failed to read settings file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let settings: Self = serde_yaml::from_str(&contents).map_err(|e| {
            BridgeError::config(format!(
                "Failed to parse settings file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from string content
    pub fn load_from_str(content: &str) -> BridgeResult<Self> {
        let settings: Self = serde_yaml::from_str(content)
            .map_err(|e| BridgeError::config(format!("Failed to parse settings: {e}")))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings for consistency and correctness
    pub fn validate(&self) -> BridgeResult<()> {
        if self.config_file_names.is_empty() {
            return Err(BridgeError::config(
                "At least one local configuration file name is required",
            ));
        }

        for name in &self.config_file_names {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(BridgeError::config(format!(
                    "Invalid configuration file name '{name}': must be a bare file name"
                )));
            }
        }

        Ok(())
    }

    /// Build the tool invocation argv
    ///
    /// `ruff check --output-format=json --no-cache -`, with source supplied
    /// on standard input. `--no-cache` is always present regardless of the
    /// stored flag.
    pub fn command_line(&self) -> Vec<String> {
        vec![
            "ruff".to_string(),
            "check".to_string(),
            "--output-format=json".to_string(),
            "--no-cache".to_string(),
            "-".to_string(),
        ]
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> BridgeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BridgeError::config(format!("Failed to serialize settings: {e}")))
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            no_cache: true,
            check_for_local_configuration: false,
            config_file_names: default_config_file_names(),
            selector: default_selector(),
            packages_root: None,
            type_comment_guard: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_config_file_names() -> Vec<String> {
    vec!["ruff.toml".to_string(), ".ruff.toml".to_string()]
}

fn default_selector() -> String {
    "source.python".to_string()
}

/// Settings builder for programmatic construction
pub struct SettingsBuilder {
    settings: BridgeSettings,
}

impl SettingsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self { settings: BridgeSettings::default() }
    }

    /// Require a local configuration file before linting
    pub fn check_for_local_configuration(mut self, enabled: bool) -> Self {
        self.settings.check_for_local_configuration = enabled;
        self
    }

    /// Replace the recognized local configuration file names
    pub fn config_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.config_file_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the package-management root for the type-comment guard
    pub fn packages_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.settings.packages_root = Some(root.into());
        self
    }

    /// Toggle the type-checker interop guard
    pub fn type_comment_guard(mut self, enabled: bool) -> Self {
        self.settings.type_comment_guard = enabled;
        self
    }

    /// Build the final settings
    pub fn build(self) -> BridgeResult<BridgeSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
