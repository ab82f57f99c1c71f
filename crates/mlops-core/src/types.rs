use crate::error::{MlopsError, Result};
use crate::paths;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// RepoRef
// ---------------------------------------------------------------------------

/// A validated repository name on the hosting provider.
///
/// Also the directory name `git clone` produces locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepoRef(String);

impl RepoRef {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        paths::validate_repo_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RepoRef {
    type Err = MlopsError;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// DataBinding
// ---------------------------------------------------------------------------

/// A data directory to register with DVC and where its tracked copy lives.
///
/// `output_path` is relative to the cloned repository; its existence means
/// the data was already registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBinding {
    data_path: PathBuf,
    output_path: PathBuf,
}

impl DataBinding {
    pub fn new(data_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Result<Self> {
        let data_path = data_path.into();
        let output_path = output_path.into();
        if data_path.as_os_str().is_empty() {
            return Err(MlopsError::InvalidDataBinding("data path is empty".into()));
        }
        if output_path.as_os_str().is_empty() {
            return Err(MlopsError::InvalidDataBinding("output path is empty".into()));
        }
        if output_path.is_absolute() {
            return Err(MlopsError::InvalidDataBinding(format!(
                "output path {} must be relative to the repository",
                output_path.display()
            )));
        }
        Ok(Self {
            data_path,
            output_path,
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_ref_parses_and_displays() {
        let repo: RepoRef = "proj".parse().unwrap();
        assert_eq!(repo.to_string(), "proj");
        assert!("bad name".parse::<RepoRef>().is_err());
    }

    #[test]
    fn data_binding_accepts_relative_output() {
        let binding = DataBinding::new("data/", "data/raw").unwrap();
        assert_eq!(binding.data_path(), Path::new("data/"));
        assert_eq!(binding.output_path(), Path::new("data/raw"));
    }

    #[test]
    fn data_binding_rejects_empty_and_absolute() {
        assert!(DataBinding::new("", "data/raw").is_err());
        assert!(DataBinding::new("data/", "").is_err());
        assert!(DataBinding::new("data/", "/abs/raw").is_err());
    }
}
