#![deny(unsafe_code)]

//! fwstamp CLI: stamps firmware builds with the `git describe` version.
//!
//! Stdout carries only what the host build tool consumes (the flag, the
//! version, or the resolved config). Diagnostics go to stderr.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fwstamp_config::AppConfig;
use fwstamp_core::{DescribeParts, GitDescribe, StampOptions, VersionFlagProvider, WriterFlags};

/// fwstamp: embed the firmware version from git tags into your build.
#[derive(Debug, Parser)]
#[command(name = "fwstamp", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "fwstamp.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run the describe query in this directory.
    #[arg(short = 'C', long = "repo", value_name = "DIR")]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the version build flag for the host build tool.
    ///
    /// For PlatformIO: `build_flags = !fwstamp flag`
    Flag,

    /// Print the trimmed describe output.
    Describe {
        /// Print the version and its parsed components as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a C header defining the version macro, if it changed.
    Header {
        /// Header file to write.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Serialize)]
struct DescribeReport<'a> {
    version: &'a str,
    #[serde(flatten)]
    parts: Option<DescribeParts>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_found = cli.config.exists();
    let mut config = load_config(&cli.config).await?;
    init_tracing(cli.verbose, &config.logging.level);
    if !config_found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    if let Some(repo) = &cli.repo {
        config.describe.repo_dir = Some(repo.clone());
    }

    match cli.command {
        Commands::Flag => cmd_flag(&config)?,
        Commands::Describe { json } => cmd_describe(&config, json)?,
        Commands::Header { output } => cmd_header(&config, &output).await?,
        Commands::Config { show } => cmd_config(&cli.config, config_found, &config, show)?,
    }

    Ok(())
}

/// Set up the stderr subscriber. `RUST_LOG` wins, then `-v`, then config.
fn init_tracing(verbose: u8, configured: &str) {
    let filter = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn provider(config: &AppConfig) -> VersionFlagProvider<GitDescribe> {
    VersionFlagProvider::with_options(
        GitDescribe::from_config(&config.describe),
        StampOptions::from_config(config),
    )
}

fn cmd_flag(config: &AppConfig) -> Result<()> {
    let mut env = WriterFlags::new(io::stdout().lock());
    provider(config)
        .compute_firmware_version_flag(&mut env)
        .context("cannot stamp firmware version")?;
    let _stdout = env.finish().context("failed to write build flag")?;
    Ok(())
}

fn cmd_describe(config: &AppConfig, json: bool) -> Result<()> {
    let version = provider(config)
        .describe_version()
        .context("cannot determine firmware version")?;
    if json {
        let report = DescribeReport {
            version: version.as_str(),
            parts: version.parts().ok(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{version}");
    }
    Ok(())
}

async fn cmd_header(config: &AppConfig, output: &Path) -> Result<()> {
    let provider = provider(config);
    let version = provider
        .describe_version()
        .context("cannot determine firmware version")?;
    let definition = provider.definition_for(&version);
    let parts = version.parts().ok();
    let contents = fwstamp_core::header::render_header(&definition, parts.as_ref());
    fwstamp_core::header::write_if_changed(output, &contents)
        .await
        .with_context(|| format!("failed to write header '{}'", output.display()))?;
    Ok(())
}

fn cmd_config(config_path: &Path, found: bool, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(config).context("failed to render config")?;
        println!("{toml_str}");
    } else {
        println!("{}", config_status(config_path, found));
    }
    Ok(())
}

fn config_status(config_path: &Path, found: bool) -> String {
    if found {
        format!("Configuration at '{}' is valid.", config_path.display())
    } else {
        format!(
            "No configuration at '{}'; using defaults.",
            config_path.display()
        )
    }
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path)
            .await
            .with_context(|| format!("invalid config '{}'", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}
