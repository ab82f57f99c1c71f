//! Detection of the external CLIs the orchestrator drives.

use crate::error::{MlopsError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Binaries every setup run shells out to.
pub const REQUIRED_TOOLS: [&str; 2] = ["git", "dvc"];

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn installed(&self) -> bool {
        self.path.is_some()
    }
}

pub fn locate_tools() -> Vec<ToolStatus> {
    REQUIRED_TOOLS
        .iter()
        .map(|&name| ToolStatus {
            name,
            path: which::which(name).ok(),
        })
        .collect()
}

/// Fail on the first required tool that is not on PATH.
pub fn check_tools() -> Result<()> {
    match locate_tools().into_iter().find(|t| !t.installed()) {
        Some(missing) => Err(MlopsError::ToolNotInstalled(missing.name.to_string())),
        None => Ok(()),
    }
}
