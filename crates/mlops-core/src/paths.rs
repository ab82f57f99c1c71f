use crate::error::{MlopsError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Directory created by `dvc init`; its presence gates the storage stage.
pub const DVC_DIR: &str = ".dvc";

pub const CONFIG_FILE: &str = "mlops.yaml";
pub const HOME_CONFIG_FILE: &str = ".mlops.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Where `git clone` places `repo` when run from `workdir`.
pub fn repo_dir(workdir: &Path, repo: &str) -> PathBuf {
    workdir.join(repo)
}

pub fn dvc_marker(repo_dir: &Path) -> PathBuf {
    repo_dir.join(DVC_DIR)
}

pub fn local_config_path(workdir: &Path) -> PathBuf {
    workdir.join(CONFIG_FILE)
}

pub fn home_config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(HOME_CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Repository name validation
// ---------------------------------------------------------------------------

static REPO_RE: OnceLock<Regex> = OnceLock::new();

fn repo_re() -> &'static Regex {
    REPO_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").unwrap())
}

/// Repository names become URL path segments and a local directory name.
pub fn validate_repo_name(repo: &str) -> Result<()> {
    if repo.is_empty()
        || repo.len() > 100
        || !repo_re().is_match(repo)
        || repo.ends_with(".git")
    {
        return Err(MlopsError::InvalidRepoName(repo.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
