use std::path::PathBuf;

use dinoq_training::config::TrainingConfig;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ConfigArg) -> anyhow::Result<()> {
    let ConfigArg { output } = arg;
    let mut config = TrainingConfig::default();
    config.encoder = Some(config.encoder());
    util::write_json(&config, output.as_deref())?;
    if let Some(path) = output {
        eprintln!("Default configuration written to {}", path.display());
    }
    Ok(())
}
