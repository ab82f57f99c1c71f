use crate::error::{MlopsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// FailurePolicy
// ---------------------------------------------------------------------------

/// What `ensure_initialized` does after a stage reports a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Run the remaining stages anyway; a later run retries what is missing.
    #[default]
    Continue,
    Halt,
}

// ---------------------------------------------------------------------------
// RemoteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,
    #[serde(default = "default_remote_url")]
    pub url: String,
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_remote_url() -> String {
    "s3://dvc".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: default_remote_name(),
            url: default_remote_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Tracking server host; falls back to the top-level `host`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_version() -> u32 {
    1
}

fn default_host() -> String {
    "dagshub.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            host: default_host(),
            remote: RemoteConfig::default(),
            tracking: TrackingConfig::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}

impl Config {
    pub fn tracking_host(&self) -> &str {
        self.tracking.host.as_deref().unwrap_or(&self.host)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&data).map_err(|e| MlopsError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Resolve and load the active config.
    ///
    /// Priority:
    /// 1. `explicit` (`--config` / `MLOPS_CONFIG`), which must exist
    /// 2. `mlops.yaml` in `workdir`
    /// 3. `~/.mlops.yaml`
    /// 4. Built-in defaults
    pub fn resolve(explicit: Option<&Path>, workdir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(p) = explicit {
            return Ok((Self::load(p)?, Some(p.to_path_buf())));
        }
        let candidates = [Some(paths::local_config_path(workdir)), paths::home_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                let cfg = Self::load(&path)?;
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("unsupported config version {}", self.version),
            });
        }

        check_host(&mut warnings, "host", &self.host);
        if let Some(host) = &self.tracking.host {
            check_host(&mut warnings, "tracking.host", host);
        }

        let name = &self.remote.name;
        if name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "remote.name is empty".to_string(),
            });
        } else if name.contains(char::is_whitespace) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("remote.name '{name}' contains whitespace"),
            });
        }

        if !self.remote.url.contains("://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "remote.url '{}' has no scheme (expected e.g. s3://bucket)",
                    self.remote.url
                ),
            });
        }

        warnings
    }
}

fn check_host(warnings: &mut Vec<ConfigWarning>, field: &str, host: &str) {
    if host.trim().is_empty() {
        warnings.push(ConfigWarning {
            level: WarnLevel::Error,
            message: format!("{field} is empty"),
        });
    } else if host.contains("://") {
        warnings.push(ConfigWarning {
            level: WarnLevel::Error,
            message: format!("{field} '{host}' must be a bare host name without a scheme"),
        });
    } else if host.ends_with('/') {
        warnings.push(ConfigWarning {
            level: WarnLevel::Warning,
            message: format!("{field} '{host}' has a trailing slash"),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
