use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    Approximator, LoadWeightsError, WeightsBlob,
    adam::{Adam, AdamConfig},
    dense::Dense,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    /// Hidden layer widths. Empty gives a linear model.
    pub hidden_layers: Vec<usize>,
    pub optimizer: AdamConfig,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![24, 24],
            optimizer: AdamConfig::default(),
        }
    }
}

/// Feed-forward network with ReLU hidden layers and a linear output layer,
/// trained on squared error with Adam.
///
/// The saved blob lists `kernel, bias` per layer, input side first, with
/// kernel shape `[in, out]`.
///
/// # Example
///
/// ```
/// use dinoq_agent::approximator::{Approximator, Mlp, MlpConfig};
/// use rand::SeedableRng;
/// use rand_pcg::Pcg32;
///
/// let mut rng = Pcg32::seed_from_u64(0);
/// let mut net = Mlp::new(4, 2, &MlpConfig::default(), &mut rng);
///
/// let state = [0.1, 0.2, 0.3, 0.4];
/// let before = net.fit(&state, &[1.0, -1.0]);
/// let mut after = before;
/// for _ in 0..200 {
///     after = net.fit(&state, &[1.0, -1.0]);
/// }
/// assert!(after < before);
/// ```
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Dense>,
    optimizer: Adam,
}

impl Mlp {
    pub fn new<R>(input_len: usize, output_len: usize, config: &MlpConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let widths = std::iter::once(input_len)
            .chain(config.hidden_layers.iter().copied())
            .chain(std::iter::once(output_len))
            .collect::<Vec<_>>();
        let layers = widths
            .windows(2)
            .map(|pair| Dense::glorot(pair[0], pair[1], &mut *rng))
            .collect::<Vec<_>>();
        let optimizer = Adam::new(
            config.optimizer,
            layers.iter().flat_map(|l| [l.kernel.len(), l.bias.len()]),
        );
        Self { layers, optimizer }
    }

    /// Expected tensor shapes, in blob order.
    #[must_use]
    pub fn layout(&self) -> Vec<Vec<usize>> {
        self.layers
            .iter()
            .flat_map(|l| [l.kernel_shape(), l.bias_shape()])
            .collect()
    }

    fn is_output(&self, index: usize) -> bool {
        index + 1 == self.layers.len()
    }

    /// Returns the input of every layer followed by the network output.
    fn forward_trace(&self, state: &[f32]) -> Vec<Vec<f32>> {
        let mut trace = Vec::with_capacity(self.layers.len() + 1);
        trace.push(state.to_vec());
        for (index, layer) in self.layers.iter().enumerate() {
            let mut z = layer.forward(&trace[index]);
            if !self.is_output(index) {
                relu(&mut z);
            }
            trace.push(z);
        }
        trace
    }
}

fn relu(values: &mut [f32]) {
    for v in values {
        *v = v.max(0.0);
    }
}

impl Approximator for Mlp {
    fn input_len(&self) -> usize {
        self.layers.first().map_or(0, |l| l.in_dim)
    }

    fn output_len(&self) -> usize {
        self.layers.last().map_or(0, |l| l.out_dim)
    }

    fn predict(&self, state: &[f32]) -> Vec<f32> {
        assert_eq!(state.len(), self.input_len(), "state length");
        self.forward_trace(state).pop().unwrap_or_default()
    }

    #[expect(clippy::cast_precision_loss)]
    fn fit(&mut self, state: &[f32], target: &[f32]) -> f32 {
        assert_eq!(state.len(), self.input_len(), "state length");
        assert_eq!(target.len(), self.output_len(), "target length");
        let trace = self.forward_trace(state);
        let Some(output) = trace.last() else {
            return 0.0;
        };
        let n = target.len().max(1) as f32;
        let loss = output
            .iter()
            .zip(target)
            .map(|(y, t)| (y - t).powi(2))
            .sum::<f32>()
            / n;

        // mean squared error gradient
        let mut delta = output
            .iter()
            .zip(target)
            .map(|(y, t)| 2.0 * (y - t) / n)
            .collect::<Vec<_>>();
        let mut grads = Vec::with_capacity(self.layers.len());
        for (index, layer) in self.layers.iter().enumerate().rev() {
            let input = &trace[index];
            let (grad, mut grad_in) = layer.backward(input, &delta);
            grads.push(grad);
            if index > 0 {
                // input is the post-ReLU activation of the previous layer
                for (g, a) in grad_in.iter_mut().zip(input) {
                    if *a <= 0.0 {
                        *g = 0.0;
                    }
                }
            }
            delta = grad_in;
        }
        grads.reverse();

        let params = self
            .layers
            .iter_mut()
            .flat_map(|Dense { kernel, bias, .. }| [kernel, bias]);
        let grads = grads.iter().flat_map(|g| [&g.kernel, &g.bias]);
        self.optimizer.apply(params, grads);
        loss
    }

    fn save(&self) -> WeightsBlob {
        WeightsBlob::new(self.layers.iter().flat_map(Dense::to_tensors).collect())
    }

    fn load(&mut self, blob: &WeightsBlob) -> Result<(), LoadWeightsError> {
        blob.check_layout(&self.layout())?;
        for (layer, pair) in self.layers.iter_mut().zip(blob.tensors.chunks_exact(2)) {
            layer.kernel.clone_from(&pair[0].data);
            layer.bias.clone_from(&pair[1].data);
        }
        self.optimizer.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn net(hidden: Vec<usize>) -> Mlp {
        let config = MlpConfig {
            hidden_layers: hidden,
            ..MlpConfig::default()
        };
        Mlp::new(6, 3, &config, &mut Pcg32::seed_from_u64(11))
    }

    #[test]
    fn test_dimensions_and_layout() {
        let net = net(vec![24, 24]);
        assert_eq!(net.input_len(), 6);
        assert_eq!(net.output_len(), 3);
        assert_eq!(
            net.layout(),
            vec![
                vec![6, 24],
                vec![24],
                vec![24, 24],
                vec![24],
                vec![24, 3],
                vec![3]
            ]
        );
        assert_eq!(net.predict(&[0.0; 6]).len(), 3);
    }

    #[test]
    fn test_repeated_fit_converges_on_a_target() {
        for hidden in [vec![24, 24], vec![]] {
            let mut net = net(hidden);
            let state = [0.5, -0.2, 0.1, 0.9, 0.0, 0.3];
            let target = [1.0, 0.0, -1.0];
            let first = net.fit(&state, &target);
            let mut last = first;
            for _ in 0..3000 {
                last = net.fit(&state, &target);
            }
            assert!(last < first * 0.05, "{first} -> {last}");
        }
    }

    #[test]
    fn test_save_load_reproduces_predictions() {
        let mut source = net(vec![8]);
        let state = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        for _ in 0..10 {
            source.fit(&state, &[0.3, 0.2, 0.1]);
        }
        let blob = source.save();
        let json = serde_json::to_string(&blob).unwrap();

        let mut restored = Mlp::new(
            6,
            3,
            &MlpConfig {
                hidden_layers: vec![8],
                ..MlpConfig::default()
            },
            &mut Pcg32::seed_from_u64(99),
        );
        restored
            .load(&serde_json::from_str(&json).unwrap())
            .unwrap();
        assert_eq!(restored.predict(&state), source.predict(&state));
    }

    #[test]
    fn test_load_rejects_foreign_layout() {
        let mut target = net(vec![24, 24]);
        let before = target.save();
        let err = target.load(&net(vec![16]).save()).unwrap_err();
        assert!(matches!(err, LoadWeightsError::TensorCount { .. }));
        let err = target
            .load(&Mlp::new(5, 3, &MlpConfig::default(), &mut Pcg32::seed_from_u64(0)).save())
            .unwrap_err();
        assert!(matches!(
            err,
            LoadWeightsError::ShapeMismatch { index: 0, .. }
        ));
        assert_eq!(target.save(), before);
    }
}
