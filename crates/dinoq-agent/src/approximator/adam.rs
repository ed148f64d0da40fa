use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// Adam moment estimates for a fixed list of parameter buffers.
#[derive(Debug, Clone)]
pub(super) struct Adam {
    config: AdamConfig,
    step: i32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    pub(super) fn new(config: AdamConfig, sizes: impl IntoIterator<Item = usize>) -> Self {
        let (m, v) = sizes
            .into_iter()
            .map(|len| (vec![0.0; len], vec![0.0; len]))
            .unzip();
        Self {
            config,
            step: 0,
            m,
            v,
        }
    }

    /// Forgets the moment estimates, e.g. after the parameters were replaced.
    pub(super) fn reset(&mut self) {
        self.step = 0;
        for buf in self.m.iter_mut().chain(&mut self.v) {
            buf.fill(0.0);
        }
    }

    /// Applies one update. `params` and `grads` are matched by position with
    /// the buffer sizes given at construction.
    pub(super) fn apply<'a>(
        &mut self,
        params: impl IntoIterator<Item = &'a mut Vec<f32>>,
        grads: impl IntoIterator<Item = &'a Vec<f32>>,
    ) {
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        self.step = self.step.saturating_add(1);
        let correction1 = 1.0 - beta1.powi(self.step);
        let correction2 = 1.0 - beta2.powi(self.step);

        let slots = self.m.iter_mut().zip(&mut self.v);
        for ((param, grad), (m, v)) in params.into_iter().zip(grads).zip(slots) {
            for (((p, g), m), v) in param.iter_mut().zip(grad).zip(m).zip(v) {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / correction1;
                let v_hat = *v / correction2;
                *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
            }
        }
    }
}
