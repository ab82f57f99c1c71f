//! Typed per-stage outcomes of a setup run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Identity,
    Clone,
    StorageInit,
    DataRegistration,
    /// `git add` / `git commit` / `git push`, folded into the stage it follows.
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Identity => "identity",
            Stage::Clone => "clone",
            Stage::StorageInit => "storage_init",
            Stage::DataRegistration => "data_registration",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageFailure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailure {
    /// Rendered command with secrets masked.
    pub command: String,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageFailure {
    Command(CommandFailure),
    PostconditionMissing { path: String, reason: String },
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageFailure::Command(c) => {
                write!(f, "`{}` failed", c.command)?;
                if let Some(code) = c.exit_code {
                    write!(f, " (exit {code})")?;
                }
                let stderr = c.stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            StageFailure::PostconditionMissing { path, reason } => {
                write!(f, "{reason}: {path} does not exist")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StageReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Completed => f.write_str("completed"),
            StageStatus::Skipped => f.write_str("skipped"),
            StageStatus::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Number of external commands issued by this stage.
    pub commands: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StageFailure>,
}

impl StageReport {
    pub fn skipped(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            commands: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn started(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            commands: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, failure: StageFailure) {
        self.failures.push(failure);
        self.status = StageStatus::Failed;
    }

    /// Fold a sub-step (e.g. the commit after storage init) into this stage.
    pub(crate) fn absorb(&mut self, other: StageReport) {
        self.commands += other.commands;
        for failure in other.failures {
            self.record(failure);
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == StageStatus::Failed
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub repo: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub(crate) fn begin(repo: &str) -> Self {
        let now = Utc::now();
        Self {
            repo: repo.to_string(),
            started_at: now,
            finished_at: now,
            stages: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn succeeded(&self) -> bool {
        !self.stages.iter().any(StageReport::is_failed)
    }

    pub fn commands_issued(&self) -> usize {
        self.stages.iter().map(|s| s.commands).sum()
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Stage, &StageFailure)> {
        self.stages
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (s.stage, f)))
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> StageFailure {
        StageFailure::Command(CommandFailure {
            command: "git commit -m \"Initialize DVC\"".to_string(),
            exit_code: Some(1),
            stderr: "nothing to commit\n".to_string(),
        })
    }

    #[test]
    fn absorb_sums_commands_and_propagates_failure() {
        let mut stage = StageReport::started(Stage::StorageInit);
        stage.commands = 6;
        let mut commit = StageReport::started(Stage::StorageInit);
        commit.commands = 3;
        commit.record(failure());

        stage.absorb(commit);
        assert_eq!(stage.commands, 9);
        assert_eq!(stage.status, StageStatus::Failed);
        assert_eq!(stage.failures.len(), 1);
    }

    #[test]
    fn run_report_aggregates() {
        let mut report = RunReport::begin("proj");
        report.stages.push(StageReport::skipped(Stage::Identity));
        let mut clone = StageReport::started(Stage::Clone);
        clone.commands = 1;
        report.stages.push(clone);
        assert!(report.succeeded());
        assert_eq!(report.commands_issued(), 1);

        let mut storage = StageReport::started(Stage::StorageInit);
        storage.record(failure());
        report.stages.push(storage);
        assert!(!report.succeeded());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.stage(Stage::Clone).map(|s| s.status),
            Some(StageStatus::Completed)
        );
    }

    #[test]
    fn failure_display_includes_exit_and_stderr() {
        assert_eq!(
            failure().to_string(),
            "`git commit -m \"Initialize DVC\"` failed (exit 1): nothing to commit"
        );
        let missing = StageFailure::PostconditionMissing {
            path: "/work/proj".to_string(),
            reason: "clone did not produce the repository".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "clone did not produce the repository: /work/proj does not exist"
        );
    }

    #[test]
    fn json_uses_snake_case_tags() {
        let mut report = RunReport::begin("proj");
        let mut storage = StageReport::started(Stage::StorageInit);
        storage.record(failure());
        report.stages.push(storage);
        let json = report.finish().to_json().unwrap();
        assert!(json.contains("\"storage_init\""));
        assert!(json.contains("\"kind\": \"command\""));
        assert!(json.contains("\"failed\""));
    }
}
