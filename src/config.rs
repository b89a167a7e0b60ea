//! Range configuration — bound policies and slot budget loaded from ~/.multirange/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::range::{ControlDomain, ExtensionPolicy, InsertPolicy};

/// Settings shared by every range collection an instrument creates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiRangeConfig {
    /// Which control value the ranges split on.
    #[serde(default)]
    pub domain: ControlDomain,
    /// Provisional bound for newly inserted ranges.
    #[serde(default)]
    pub insert_policy: InsertPolicy,
    /// Bounds for ranges appended by a kind conversion.
    #[serde(default)]
    pub extension_policy: ExtensionPolicy,
    /// Most ranges a collection may hold. None = limited only by the allocator.
    #[serde(default)]
    pub max_ranges: Option<usize>,
}

impl MultiRangeConfig {
    /// Load config from the standard path (~/.multirange/config.yaml).
    /// Returns None if the file doesn't exist or doesn't parse.
    pub fn load() -> Option<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from `path`. Returns None if the file doesn't exist or doesn't parse.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::from_yaml(&content)
    }

    /// Parse config from YAML text.
    pub fn from_yaml(content: &str) -> Option<Self> {
        match serde_yaml::from_str(content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable range config");
                None
            }
        }
    }

    /// Same config with a different slot budget.
    pub fn with_max_ranges(mut self, max_ranges: Option<usize>) -> Self {
        self.max_ranges = max_ranges;
        self
    }
}

/// Directory that holds the config file and saved range files.
pub fn base_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".multirange"))
}

fn config_path() -> Option<PathBuf> {
    base_dir().map(|dir| dir.join("config.yaml"))
}
