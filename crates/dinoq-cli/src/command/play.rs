use std::path::PathBuf;

use anyhow::Context;
use dinoq_agent::approximator::Approximator as _;
use dinoq_engine::{EnvSeed, Environment};
use dinoq_training::{
    boundary::LocalEnvironment,
    checkpoint::{CheckpointStore as _, JsonFileStore, ScoreStats},
    trainer,
};

use crate::util::{self, AgentParts};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Directory holding the trained weights
    #[arg(long, default_value = util::DEFAULT_CHECKPOINT_DIR)]
    checkpoint_dir: PathBuf,
    /// Training configuration JSON file the weights were trained with
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of episodes to play
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    /// End an episode after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Environment seed as 32 hex digits
    #[arg(long)]
    seed: Option<EnvSeed>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        checkpoint_dir,
        config,
        episodes,
        max_ticks,
        seed,
    } = arg;

    let mut config = util::load_training_config(config.as_deref())?;
    if let Some(seed) = seed {
        config.engine.seed = Some(*seed);
    }
    let AgentParts {
        encoder,
        mut controller,
        ..
    } = util::build_agent(&config);
    controller.set_epsilon(0.0);

    let store = JsonFileStore::new(checkpoint_dir);
    let weights = store.load_weights().with_context(|| {
        format!(
            "No trained weights found in {}",
            checkpoint_dir.display()
        )
    })?;
    controller
        .approximator_mut()
        .load(&weights)
        .context("Stored weights do not match the configured network")?;

    let env = Environment::new(config.engine.clone());
    eprintln!("Environment seed: {}", env.seed());
    let mut env = LocalEnvironment::new(env, config.controller.jump_spacing_ticks);
    let scores = trainer::evaluate(&mut env, &mut controller, &encoder, *episodes, *max_ticks)
        .context("Failed to observe the environment")?;

    for (i, score) in scores.iter().enumerate() {
        eprintln!("  Episode {:3}: {score}", i + 1);
    }
    if let Some(stats) = ScoreStats::from_scores(scores.iter().copied()) {
        eprintln!();
        eprintln!("  Min:  {}", stats.min);
        eprintln!("  Max:  {}", stats.max);
        eprintln!("  Mean: {:.1}", stats.mean);
    }

    Ok(())
}
