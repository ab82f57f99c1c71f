use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use mlops_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the resolved configuration and where it came from
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(
    workdir: &Path,
    config_path: Option<&Path>,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let (config, source) =
        Config::resolve(config_path, workdir).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, source.as_deref(), json),
        ConfigSubcommand::Validate => validate(&config, json),
    }
}

fn show(config: &Config, source: Option<&Path>, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "source": source.map(|p| p.display().to_string()),
            "config": config,
        }));
    }
    match source {
        Some(p) => println!("# source: {}", p.display()),
        None => println!("# source: built-in defaults"),
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
