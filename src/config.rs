use crate::mutation::CheckInType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default config file path (~/.config/provision/config.toml)
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("provision").join("config.toml"))
}

// ============================================================================
// Provision Config
// ============================================================================

/// Engine configuration
///
/// ```toml
/// [deploy]
/// enforce_host_constraints = true
/// trace_events = false
///
/// [mutation]
/// comment = "Provision"
/// check_in = "major"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub deploy: DeployOptions,

    #[serde(default)]
    pub mutation: MutationOptions,
}

/// Traversal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployOptions {
    /// Fail when a definition is placed under a parent or root its type
    /// does not declare
    pub enforce_host_constraints: bool,

    /// Log every lifecycle event at debug level
    pub trace_events: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            enforce_host_constraints: true,
            trace_events: false,
        }
    }
}

/// Safe-mutation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationOptions {
    /// Comment attached to unpublish, check-in, publish and approve
    pub comment: String,

    pub check_in: CheckInType,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self {
            comment: "Provision".to_string(),
            check_in: CheckInType::Major,
        }
    }
}

impl ProvisionConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in provision config")
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config file, or return the default if it doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the config, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::debug!("Saved config to {}", path.display());
        Ok(())
    }
}
