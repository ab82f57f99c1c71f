use crate::credentials::CredentialArgs;
use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use mlops_core::{config::Config, tracking::EnvTrackingClient, types::RepoRef, RepoOrchestrator};
use std::path::Path;

#[derive(Args)]
pub struct TrackingArgs {
    /// Repository name under your DagsHub account
    pub repo: String,

    /// Print `export` lines for MLflow (use with `eval "$(mlops tracking ... --shell)"`)
    #[arg(long)]
    pub shell: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

pub fn run(
    workdir: &Path,
    config_path: Option<&Path>,
    args: TrackingArgs,
    json: bool,
) -> anyhow::Result<()> {
    let repo = RepoRef::new(args.repo).context("invalid repository")?;
    let credentials = args.credentials.resolve()?;
    let (config, _) = Config::resolve(config_path, workdir).context("failed to load config")?;

    let mut orchestrator = RepoOrchestrator::system(credentials, config, workdir);
    let setup = orchestrator
        .register_tracking_endpoint(&repo, &mut EnvTrackingClient)
        .context("failed to register tracking endpoint")?;
    for failure in &setup.identity.failures {
        tracing::warn!(%failure, "git identity not configured");
    }
    let registration = setup.registration;

    if json {
        print_json(&registration)?;
    } else if args.shell {
        print!("{}", registration.shell_exports());
    } else {
        println!("{}", registration.uri);
    }
    Ok(())
}
