//! Idempotent setup of a DVC-versioned project on a hosted Git remote.
//!
//! `ensure_initialized` walks four stages, each gated by whether a path
//! already exists:
//!
//! | stage             | skipped when                  |
//! |-------------------|-------------------------------|
//! | identity          | already configured (in memory) |
//! | clone             | `<workdir>/<repo>` exists     |
//! | storage init      | `<repo>/.dvc` exists          |
//! | data registration | `<repo>/<output_path>` exists |
//!
//! Nothing else records progress, so re-running against a half-finished
//! tree only performs what is missing.
//!
//! Command failures never abort a stage. They are logged, recorded in the
//! stage's [`StageReport`] and the remaining commands still run. Whether a
//! failed stage stops the run is governed by [`FailurePolicy`]. A clone that
//! leaves no repository directory always does, since every later stage works
//! inside the clone.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::command::{CommandRunner, ShellCommand, SystemRunner};
use crate::config::{Config, FailurePolicy};
use crate::credentials::Credentials;
use crate::paths;
use crate::probe::{LocalProbe, PathProbe};
use crate::report::{CommandFailure, RunReport, Stage, StageFailure, StageReport};
use crate::tracking::{TrackingClient, TrackingRegistration};
use crate::types::{DataBinding, RepoRef};
use crate::urls;

pub const INIT_COMMIT_MESSAGE: &str = "Initialize DVC";
pub const DATA_COMMIT_MESSAGE: &str = "Added Versioned Data";

/// Outcome of [`RepoOrchestrator::register_tracking_endpoint`].
#[derive(Debug, Clone)]
pub struct TrackingSetup {
    /// Skipped when identity was already configured by this orchestrator.
    pub identity: StageReport,
    pub registration: TrackingRegistration,
}

pub struct RepoOrchestrator<R = SystemRunner, P = LocalProbe> {
    credentials: Credentials,
    config: Config,
    runner: R,
    probe: P,
    /// Where repositories are cloned into.
    workdir: PathBuf,
    /// Directory later commands run in; moves into the clone once it exists.
    current_dir: PathBuf,
    identity_configured: bool,
}

impl RepoOrchestrator {
    /// Orchestrator over real processes and the real filesystem.
    pub fn system(credentials: Credentials, config: Config, workdir: impl Into<PathBuf>) -> Self {
        Self::new(credentials, config, workdir, SystemRunner, LocalProbe)
    }
}

impl<R: CommandRunner, P: PathProbe> RepoOrchestrator<R, P> {
    pub fn new(
        credentials: Credentials,
        config: Config,
        workdir: impl Into<PathBuf>,
        runner: R,
        probe: P,
    ) -> Self {
        let workdir = workdir.into();
        Self {
            credentials,
            config,
            runner,
            probe,
            current_dir: workdir.clone(),
            workdir,
            identity_configured: false,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn identity_configured(&self) -> bool {
        self.identity_configured
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Command execution
    // -----------------------------------------------------------------------

    /// Run `command` in the current directory.
    ///
    /// Returns stdout on success. A non-zero exit or spawn error is logged
    /// once and returned as a [`CommandFailure`].
    pub fn execute(&self, command: &ShellCommand) -> Result<String, CommandFailure> {
        self.execute_in(command, &self.current_dir)
    }

    /// Like [`execute`](Self::execute) but collapses failure to `None`.
    pub fn execute_shell_command(&self, command: &ShellCommand) -> Option<String> {
        self.execute(command).ok()
    }

    fn execute_in(&self, command: &ShellCommand, cwd: &Path) -> Result<String, CommandFailure> {
        debug!(command = %command, cwd = %cwd.display(), "running command");
        let failure = match self.runner.run(command, cwd) {
            Ok(output) if output.success => return Ok(output.stdout),
            Ok(output) => CommandFailure {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: command.redact(&output.stderr),
            },
            Err(e) => CommandFailure {
                command: command.to_string(),
                exit_code: None,
                stderr: command.redact(&e.to_string()),
            },
        };
        error!(
            command = %failure.command,
            stderr = %failure.stderr.trim(),
            "error executing command"
        );
        Err(failure)
    }

    /// Run every command in order, recording failures without stopping.
    fn run_all<I>(&self, report: &mut StageReport, commands: I)
    where
        I: IntoIterator<Item = ShellCommand>,
    {
        for command in commands {
            report.commands += 1;
            if let Err(failure) = self.execute(&command) {
                report.record(StageFailure::Command(failure));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Command builders
    // -----------------------------------------------------------------------

    fn git(&self) -> ShellCommand {
        ShellCommand::new("git").secret(self.credentials.token())
    }

    fn dvc(&self) -> ShellCommand {
        ShellCommand::new("dvc").secret(self.credentials.token())
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        urls::authenticated_repo_url(&self.config.host, &self.credentials, repo.as_str())
    }

    fn storage_commands(&self, repo: &RepoRef) -> Vec<ShellCommand> {
        let remote = self.config.remote.name.as_str();
        let token = self.credentials.token();
        let endpoint = urls::storage_endpoint_url(
            &self.config.host,
            self.credentials.user_name(),
            repo.as_str(),
        );
        vec![
            self.dvc().arg("init"),
            self.dvc()
                .args(["remote", "add", remote])
                .arg(self.config.remote.url.as_str()),
            self.dvc()
                .args(["remote", "modify", remote, "endpointurl"])
                .arg(endpoint),
            // The token doubles as both halves of the S3 key pair.
            self.dvc()
                .args(["remote", "modify", "--local", remote, "access_key_id", token]),
            self.dvc()
                .args(["remote", "modify", "--local", remote, "secret_access_key", token]),
            self.dvc().args(["remote", "default", remote]),
        ]
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Set the global git identity, once per orchestrator.
    pub fn configure_identity(&mut self) -> StageReport {
        if self.identity_configured {
            return StageReport::skipped(Stage::Identity);
        }
        let mut report = StageReport::started(Stage::Identity);
        let commands = [
            self.git()
                .args(["config", "--global", "user.email", self.credentials.email()]),
            self.git()
                .args(["config", "--global", "user.name", self.credentials.user_name()]),
        ];
        self.run_all(&mut report, commands);
        // Set regardless of outcome; a new orchestrator retries.
        self.identity_configured = true;
        if !report.is_failed() {
            info!(user = %self.credentials.user_name(), "git configuration set");
        }
        report
    }

    /// Clone `repo` into the working directory and move into it.
    ///
    /// If the clone directory does not exist afterwards the current
    /// directory is left where it was.
    pub fn clone_repository(&mut self, repo: &RepoRef) -> StageReport {
        let mut report = StageReport::started(Stage::Clone);
        let command = self.git().arg("clone").arg(self.repo_url(repo));
        report.commands += 1;
        if let Err(failure) = self.execute_in(&command, &self.workdir) {
            report.record(StageFailure::Command(failure));
        }

        let target = paths::repo_dir(&self.workdir, repo.as_str());
        if !self.probe.exists(&target) {
            error!(repo = %repo, path = %target.display(), "failed to clone the repository");
            report.record(StageFailure::PostconditionMissing {
                path: target.display().to_string(),
                reason: format!("clone of {repo} did not produce the repository"),
            });
            return report;
        }

        self.current_dir = target;
        info!(repo = %repo, "repository cloned");
        report
    }

    /// `dvc init` plus the remote storage configuration. No rollback: a
    /// failing command does not stop the ones after it.
    pub fn initialize_versioned_storage(&self, repo: &RepoRef) -> StageReport {
        let mut report = StageReport::started(Stage::StorageInit);
        self.run_all(&mut report, self.storage_commands(repo));
        if !report.is_failed() {
            info!(remote = %self.config.remote.name, "DVC initialized and remote storage set up");
        }
        report
    }

    /// Stage everything, commit, push. Push runs even if the commit failed
    /// (e.g. nothing to commit).
    pub fn commit_and_push(&self, repo: &RepoRef, message: &str) -> StageReport {
        let mut report = StageReport::started(Stage::Publish);
        let commands = [
            self.git().args(["add", "."]),
            self.git().args(["commit", "-m", message]),
            self.git().arg("push").arg(self.repo_url(repo)),
        ];
        self.run_all(&mut report, commands);
        if !report.is_failed() {
            info!(commit_message = message, "changes committed and pushed");
        }
        report
    }

    /// Track `binding.data_path` with DVC at `binding.output_path` and push
    /// the data to the default remote.
    pub fn register_data_artifact(&self, binding: &DataBinding) -> StageReport {
        let mut report = StageReport::started(Stage::DataRegistration);
        let commands = [
            self.dvc()
                .arg("add")
                .arg(binding.data_path().display().to_string())
                .arg("-o")
                .arg(binding.output_path().display().to_string()),
            self.dvc()
                .args(["push", "-r"])
                .arg(self.config.remote.name.as_str()),
        ];
        self.run_all(&mut report, commands);
        if !report.is_failed() {
            info!(
                data = %binding.data_path().display(),
                output = %binding.output_path().display(),
                "data added to DVC and pushed to remote storage"
            );
        }
        report
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Bring `repo` to the fully initialized state, doing only what is
    /// missing.
    pub fn ensure_initialized(&mut self, repo: &RepoRef, binding: &DataBinding) -> RunReport {
        let mut run = RunReport::begin(repo.as_str());

        let identity = self.configure_identity();
        if !self.push_stage(&mut run, identity) {
            return run.finish();
        }

        let repo_dir = paths::repo_dir(&self.workdir, repo.as_str());
        let clone = if self.probe.exists(&repo_dir) {
            info!(repo = %repo, "repository already present");
            self.current_dir = repo_dir.clone();
            StageReport::skipped(Stage::Clone)
        } else {
            self.clone_repository(repo)
        };
        // A clone command can fail after git has already written the
        // directory (checkout failure); only a missing directory ends the run.
        let cloned = self.probe.exists(&repo_dir);
        if !self.push_stage(&mut run, clone) || !cloned {
            return run.finish();
        }

        let storage = if self.probe.exists(&paths::dvc_marker(&self.current_dir)) {
            info!("DVC already initialized");
            StageReport::skipped(Stage::StorageInit)
        } else {
            let mut stage = self.initialize_versioned_storage(repo);
            stage.absorb(self.commit_and_push(repo, INIT_COMMIT_MESSAGE));
            stage
        };
        if !self.push_stage(&mut run, storage) {
            return run.finish();
        }

        let data = if self.probe.exists(&self.current_dir.join(binding.output_path())) {
            info!(output = %binding.output_path().display(), "versioned data already present");
            StageReport::skipped(Stage::DataRegistration)
        } else {
            let mut stage = self.register_data_artifact(binding);
            stage.absorb(self.commit_and_push(repo, DATA_COMMIT_MESSAGE));
            stage
        };
        self.push_stage(&mut run, data);

        run.finish()
    }

    /// Record `stage`; returns whether the run should go on.
    fn push_stage(&self, run: &mut RunReport, stage: StageReport) -> bool {
        let halt = stage.is_failed() && self.config.on_failure == FailurePolicy::Halt;
        if halt {
            error!(stage = %stage.stage, "stage failed, halting");
        }
        run.stages.push(stage);
        !halt
    }

    /// The tracking endpoint for `repo` under the configured tracking host.
    pub fn tracking_registration(&self, repo: &RepoRef) -> TrackingRegistration {
        let user = self.credentials.user_name();
        TrackingRegistration::new(
            urls::tracking_uri(self.config.tracking_host(), user, repo.as_str()),
            user,
            self.credentials.token(),
        )
    }

    /// Make sure identity is configured, then hand the tracking endpoint for
    /// `repo` to `client`. A failed identity stage does not block the
    /// registration; it is returned in [`TrackingSetup::identity`].
    pub fn register_tracking_endpoint<C: TrackingClient + ?Sized>(
        &mut self,
        repo: &RepoRef,
        client: &mut C,
    ) -> crate::Result<TrackingSetup> {
        let identity = self.configure_identity();
        let registration = self.tracking_registration(repo);
        client.register(&registration)?;
        Ok(TrackingSetup {
            identity,
            registration,
        })
    }
}
