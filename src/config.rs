//! Engine configuration
//!
//! Where snapshots are searched for, where new ones go when no better
//! location is known, and where the preference store lives. Loaded from an
//! optional JSON file, then overridden by `TOOLSHELF_ROOT` and the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default shelf root
pub const ROOT_ENV_VAR: &str = "TOOLSHELF_ROOT";

const APP_DIR: &str = ".toolshelf";

/// Base directory for per-user toolshelf data (`~/.toolshelf`)
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default location of the engine configuration file
pub fn default_config_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directories scanned (recursively) for snapshots, in order
    pub search_roots: Vec<PathBuf>,
    /// Last fallback for new snapshots
    pub default_root: PathBuf,
    /// JSON file backing the preference store
    pub preferences_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::in_dir(app_dir())
    }
}

impl EngineConfig {
    /// Configuration keeping everything under `base`
    pub fn in_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            search_roots: Vec::new(),
            default_root: base.join("shelves"),
            preferences_path: base.join("prefs.json"),
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_root.as_os_str().is_empty() {
            anyhow::bail!("Default shelf root must be specified");
        }
        if self.preferences_path.as_os_str().is_empty() {
            anyhow::bail!("Preferences path must be specified");
        }
        if self.search_roots.iter().any(|r| r.as_os_str().is_empty()) {
            anyhow::bail!("Search roots cannot be empty paths");
        }
        Ok(())
    }

    /// Make `root` the default root and search it first
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.search_roots.retain(|r| r != &root);
        self.search_roots.insert(0, root.clone());
        self.default_root = root;
        self
    }

    /// Apply the `TOOLSHELF_ROOT` override, if set
    pub fn with_env(self) -> Self {
        self.with_env_value(std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from))
    }

    fn with_env_value(self, value: Option<PathBuf>) -> Self {
        match value {
            Some(root) if !root.as_os_str().is_empty() => self.with_root(root),
            _ => self,
        }
    }

    /// Roots discovery actually scans: the search roots, or the default root when none are set
    pub fn effective_search_roots(&self) -> Vec<PathBuf> {
        if self.search_roots.is_empty() {
            vec![self.default_root.clone()]
        } else {
            self.search_roots.clone()
        }
    }
}
