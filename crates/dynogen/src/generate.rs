use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dynogen_core::{Config, DEFAULT_CONFIG_PATH, GenerationReport};
use tracing::info;

#[derive(Parser, Debug, Eq, PartialEq)]
pub struct GenerateArgs {
    /// Path to the dynogen config
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

pub async fn subcommand_generate(args: &GenerateArgs) -> Result<GenerationReport> {
    let config = Config::load(&args.config).await?;
    let report = dynogen_core::generate(&config)
        .await
        .with_context(|| format!("generation from \"{}\" failed", args.config.display()))?;

    for path in &report.skipped {
        info!(path = %path.display(), "kept existing file");
    }
    Ok(report)
}
