mod cmd;
mod credentials;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, init::InitArgs, tracking::TrackingArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mlops",
    about = "Set up a DVC-versioned ML project on DagsHub: clone, init DVC, push data, wire up MLflow",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./mlops.yaml, then ~/.mlops.yaml)
    #[arg(long, global = true, env = "MLOPS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory repositories are cloned into (default: current directory)
    #[arg(long, global = true, env = "MLOPS_WORKDIR")]
    workdir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a repository, initialize DVC and push versioned data (skips finished steps)
    Init(InitArgs),

    /// Register the MLflow tracking endpoint for a repository
    Tracking(TrackingArgs),

    /// Check that git and dvc are installed
    Doctor,

    /// Inspect the active configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Init(_) if !cli.json => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let workdir = cli
        .workdir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init(args) => cmd::init::run(&workdir, config, args, cli.json),
        Commands::Tracking(args) => cmd::tracking::run(&workdir, config, args, cli.json),
        Commands::Doctor => cmd::doctor::run(cli.json),
        Commands::Config { subcommand } => cmd::config::run(&workdir, config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
