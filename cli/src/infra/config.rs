//! Loading `InstallerConfig` from YAML.
//!
//! Lookup order: an explicit `--config` path, `$OVNODE_CONFIG`, the system
//! file, the per-user file, then built-in defaults. An explicitly named file
//! must exist; the two well-known locations are used only when present.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::InstallerConfig;

pub const CONFIG_ENV: &str = "OVNODE_CONFIG";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const SYSTEM_CONFIG: &str = "/etc/ov-node/installer.yaml";

/// Where configuration may come from.
pub struct ConfigSources<'a> {
    pub explicit: Option<&'a Path>,
    pub env: &'a dyn Fn(&str) -> Option<String>,
    pub system: PathBuf,
    pub user: Option<PathBuf>,
}

impl<'a> ConfigSources<'a> {
    /// Real process environment and the standard locations.
    #[must_use]
    pub fn standard(explicit: Option<&'a Path>) -> Self {
        Self {
            explicit,
            env: &process_env,
            system: PathBuf::from(SYSTEM_CONFIG),
            user: dirs::config_dir().map(|d| d.join("ov-node").join("installer.yaml")),
        }
    }

    /// The file to read, if any.
    #[must_use]
    pub fn locate(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = self.explicit {
            return Some((path.to_path_buf(), true));
        }
        if let Some(path) = (self.env)(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Some((PathBuf::from(path), true));
        }
        [Some(self.system.clone()), self.user.clone()]
            .into_iter()
            .flatten()
            .find(|p| p.is_file())
            .map(|p| (p, false))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or if the
    /// chosen file cannot be read or parsed.
    pub fn load(&self) -> Result<InstallerConfig> {
        let mut config = match self.locate() {
            Some((path, required)) => {
                if required && !path.is_file() {
                    anyhow::bail!("config file {} not found", path.display());
                }
                read_yaml(&path)?
            }
            None => {
                tracing::debug!("no config file; using built-in defaults");
                InstallerConfig::default()
            }
        };
        if config.sources.github_token.is_none() {
            config.sources.github_token = (self.env)(TOKEN_ENV).filter(|t| !t.is_empty());
        }
        Ok(config)
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn read_yaml(path: &Path) -> Result<InstallerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let config = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
