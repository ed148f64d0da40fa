use dinoq_agent::{
    approximator::MlpConfig, controller::ControllerConfig, encoder::EncoderConfig,
    reward::RewardConfig,
};
use dinoq_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::trainer::TrainerConfig;

/// Every tunable of a training run.
///
/// Missing fields take their defaults, so a config file only needs the values
/// it changes:
///
/// ```
/// use dinoq_training::config::TrainingConfig;
///
/// let config: TrainingConfig =
///     serde_json::from_str(r#"{ "controller": { "epsilon": 0.05 } }"#).unwrap();
/// assert_eq!(config.controller.epsilon, 0.05);
/// assert_eq!(config.controller.gamma, 0.95);
/// assert_eq!(config.trainer.max_generations, 100_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub engine: EngineConfig,
    /// Derived from `engine` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder: Option<EncoderConfig>,
    pub network: MlpConfig,
    pub controller: ControllerConfig,
    pub reward: RewardConfig,
    pub trainer: TrainerConfig,
}

impl TrainingConfig {
    /// The encoder configuration in effect.
    #[must_use]
    pub fn encoder(&self) -> EncoderConfig {
        self.encoder
            .clone()
            .unwrap_or_else(|| EncoderConfig::for_engine(&self.engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_follows_engine_scale() {
        let mut config = TrainingConfig::default();
        config.engine.canvas_width = 1600.0;
        assert_eq!(config.encoder().canvas_width, 1600.0);

        config.encoder = Some(EncoderConfig {
            canvas_width: 640.0,
            ..EncoderConfig::default()
        });
        assert_eq!(config.encoder().canvas_width, 640.0);
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let config = TrainingConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
