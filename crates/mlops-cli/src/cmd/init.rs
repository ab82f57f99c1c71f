use crate::credentials::CredentialArgs;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Args;
use mlops_core::{
    config::{Config, FailurePolicy},
    preflight,
    report::{RunReport, Stage, StageReport, StageStatus},
    types::{DataBinding, RepoRef},
    RepoOrchestrator,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct InitArgs {
    /// Repository name under your DagsHub account
    pub repo: String,

    /// Data directory to version with DVC
    #[arg(long)]
    pub data: PathBuf,

    /// Tracked output path inside the repository
    #[arg(long)]
    pub output: PathBuf,

    /// Stop at the first failed stage instead of attempting the rest
    #[arg(long)]
    pub halt_on_failure: bool,

    /// Don't check that git and dvc are on PATH first
    #[arg(long)]
    pub skip_preflight: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

pub fn run(
    workdir: &Path,
    config_path: Option<&Path>,
    args: InitArgs,
    json: bool,
) -> anyhow::Result<()> {
    let repo = RepoRef::new(args.repo).context("invalid repository")?;
    let binding = DataBinding::new(args.data, args.output).context("invalid data binding")?;
    let credentials = args.credentials.resolve()?;

    let (mut config, _) = Config::resolve(config_path, workdir).context("failed to load config")?;
    if args.halt_on_failure {
        config.on_failure = FailurePolicy::Halt;
    }

    if !args.skip_preflight {
        preflight::check_tools().context("preflight failed (use --skip-preflight to bypass)")?;
    }

    if !json {
        println!("Initializing {repo} in: {}", workdir.display());
    }

    let mut orchestrator = RepoOrchestrator::system(credentials, config, workdir);
    let report = orchestrator.ensure_initialized(&repo, &binding);

    if json {
        print_json(&report)?;
    } else {
        print_human(&report, &binding);
    }

    let failed = report.stages.iter().filter(|s| s.is_failed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} stage(s) failed; re-run to retry the unfinished steps");
    }
    Ok(())
}

fn print_human(report: &RunReport, binding: &DataBinding) {
    for stage in &report.stages {
        println!("  {}", progress_line(stage, &report.repo, binding));
        for failure in &stage.failures {
            println!("      {failure}");
        }
    }
    println!();
    let rows: Vec<Vec<String>> = report
        .stages
        .iter()
        .map(|s| {
            vec![
                s.stage.to_string(),
                s.status.to_string(),
                s.commands.to_string(),
            ]
        })
        .collect();
    print_table(&["stage", "status", "commands"], &rows);
}

fn progress_line(stage: &StageReport, repo: &str, binding: &DataBinding) -> String {
    let data = binding.data_path().display();
    let output = binding.output_path().display();
    match (stage.stage, stage.status) {
        (Stage::Identity, StageStatus::Completed) => "git configuration set".to_string(),
        (Stage::Identity, StageStatus::Skipped) => "git configuration already set".to_string(),
        (Stage::Clone, StageStatus::Completed) => format!("repository {repo} cloned"),
        (Stage::Clone, StageStatus::Skipped) => format!("repository {repo} already present"),
        (Stage::StorageInit, StageStatus::Completed) => {
            "DVC initialized, remote storage set up, pushed \"Initialize DVC\"".to_string()
        }
        (Stage::StorageInit, StageStatus::Skipped) => "DVC already initialized".to_string(),
        (Stage::DataRegistration, StageStatus::Completed) => {
            format!("data from {data} versioned at {output}, pushed \"Added Versioned Data\"")
        }
        (Stage::DataRegistration, StageStatus::Skipped) => {
            format!("versioned data already at {output}")
        }
        (stage, StageStatus::Failed) => format!("{stage} failed"),
        (stage, status) => format!("{stage} {status}"),
    }
}
