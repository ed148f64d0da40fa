use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use dinoq_agent::{
    action::ActionSet,
    approximator::Mlp,
    controller::QController,
    encoder::StateEncoder,
};
use dinoq_training::config::TrainingConfig;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

/// Default location of the checkpoint files.
pub const DEFAULT_CHECKPOINT_DIR: &str = "./models";

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let (mut writer, target): (Box<dyn Write>, String) = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

/// Parses a JSON file; `kind` names the file in error messages.
pub fn read_json<T>(kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {kind} file: {}", path.display()))
}

/// Reads a training configuration file, or returns the defaults when no path
/// is given.
pub fn load_training_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    match path {
        Some(path) => read_json("training config", path),
        None => Ok(TrainingConfig::default()),
    }
}

/// Action set choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActionSetArg {
    /// Jump or do nothing
    Binary,
    /// Jump once, twice or three times, or do nothing
    MultiJump,
}

impl From<ActionSetArg> for ActionSet {
    fn from(arg: ActionSetArg) -> Self {
        match arg {
            ActionSetArg::Binary => ActionSet::Binary,
            ActionSetArg::MultiJump => ActionSet::MultiJump,
        }
    }
}

/// Encoder and freshly initialized controller for one configuration.
pub struct AgentParts {
    pub encoder: StateEncoder,
    pub controller: QController<Mlp>,
    /// Seed for the reward shaper.
    pub reward_seed: u64,
}

/// Builds the agent for `config`.
///
/// All randomness derives from the engine seed when one is configured.
pub fn build_agent(config: &TrainingConfig) -> AgentParts {
    let mut rng = match config.engine.seed {
        Some(seed) => Pcg32::from_seed(seed.to_bytes()),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let encoder = StateEncoder::new(config.encoder());
    let network = Mlp::new(
        encoder.state_len(),
        config.controller.action_set.arity(),
        &config.network,
        &mut rng,
    );
    let controller_rng = Pcg32::from_rng(&mut rng);
    let controller = QController::new(config.controller.clone(), network, controller_rng);
    AgentParts {
        encoder,
        controller,
        reward_seed: rng.random(),
    }
}
