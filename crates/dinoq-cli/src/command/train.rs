use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use dinoq_agent::reward::RewardShaper;
use dinoq_engine::{EnvSeed, Environment};
use dinoq_training::{
    boundary::LocalEnvironment,
    checkpoint::JsonFileStore,
    trainer::{Trainer, TrainerConfig},
};

use crate::util::{self, ActionSetArg, AgentParts};

const STOP_FILE_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Directory holding generation, high score, weights and training log
    #[arg(long, default_value = util::DEFAULT_CHECKPOINT_DIR)]
    checkpoint_dir: PathBuf,
    /// Training configuration JSON file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this generation
    #[arg(long)]
    max_generations: Option<u64>,
    /// Environment seed as 32 hex digits
    #[arg(long)]
    seed: Option<EnvSeed>,
    /// Exploration probability
    #[arg(long)]
    epsilon: Option<f64>,
    #[arg(long, value_enum)]
    action_set: Option<ActionSetArg>,
    /// End an episode after this many ticks
    #[arg(long)]
    max_episode_ticks: Option<u64>,
    /// Stop between episodes once this file exists
    #[arg(long)]
    stop_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        checkpoint_dir,
        config,
        max_generations,
        seed,
        epsilon,
        action_set,
        max_episode_ticks,
        stop_file,
    } = arg;

    let mut config = util::load_training_config(config.as_deref())?;
    if let Some(max_generations) = max_generations {
        config.trainer.max_generations = *max_generations;
    }
    if let Some(seed) = seed {
        config.engine.seed = Some(*seed);
    }
    if let Some(epsilon) = epsilon {
        config.controller.epsilon = *epsilon;
    }
    if let Some(action_set) = action_set {
        config.controller.action_set = (*action_set).into();
    }
    if max_episode_ticks.is_some() {
        config.trainer.max_episode_ticks = *max_episode_ticks;
    }

    let AgentParts {
        encoder,
        controller,
        reward_seed,
    } = util::build_agent(&config);
    let env = Environment::new(config.engine.clone());
    eprintln!("Environment seed: {}", env.seed());
    let env = LocalEnvironment::new(env, config.controller.jump_spacing_ticks);
    let store = JsonFileStore::new(checkpoint_dir);
    let trainer_config = TrainerConfig {
        seed: config.trainer.seed.or(Some(reward_seed)),
        ..config.trainer.clone()
    };
    let mut trainer = Trainer::new(
        env,
        controller,
        encoder,
        RewardShaper::new(config.reward.clone()),
        store,
        trainer_config,
    );

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(path) = stop_file.clone() {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                if path.exists() {
                    tracing::info!(path = %path.display(), "stop file found");
                    stop.store(true, Ordering::SeqCst);
                }
                thread::sleep(STOP_FILE_POLL_INTERVAL);
            }
        });
    }

    eprintln!(
        "Training from generation {} (high score {}) up to generation {}",
        trainer.generation(),
        trainer.high_score(),
        config.trainer.max_generations,
    );
    let summary = trainer.run(&stop);
    stop.store(true, Ordering::SeqCst);

    eprintln!();
    if summary.interrupted {
        eprintln!("Training stopped on request");
    } else {
        eprintln!("Training completed");
    }
    eprintln!("  Episodes:        {}", summary.episodes);
    if summary.failed_episodes > 0 {
        eprintln!("  Failed episodes: {}", summary.failed_episodes);
    }
    eprintln!("  Best score:      {}", summary.best_score);
    eprintln!("  High score:      {}", summary.high_score);
    eprintln!("  Next generation: {}", summary.next_generation);
    eprintln!("  Checkpoints:     {}", checkpoint_dir.display());

    Ok(())
}
