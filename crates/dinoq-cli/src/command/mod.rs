use clap::{Parser, Subcommand};

use self::{config::ConfigArg, play::PlayArg, records::RecordsArg, train::TrainArg};

mod config;
mod play;
mod records;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the agent online, resuming from the checkpoint directory
    Train(#[clap(flatten)] TrainArg),
    /// Play greedily with the trained weights, without learning
    Play(#[clap(flatten)] PlayArg),
    /// Summarize the training log
    Records(#[clap(flatten)] RecordsArg),
    /// Write the default training configuration as JSON
    Config(#[clap(flatten)] ConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Records(arg) => records::run(&arg)?,
        Mode::Config(arg) => config::run(&arg)?,
    }
    Ok(())
}
