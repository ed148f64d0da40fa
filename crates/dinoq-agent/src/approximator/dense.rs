use rand::Rng;

use super::Tensor;

/// Fully connected layer. The kernel is stored input-major:
/// `kernel[i * out_dim + o]` connects input `i` to output `o`.
#[derive(Debug, Clone)]
pub(super) struct Dense {
    pub(super) in_dim: usize,
    pub(super) out_dim: usize,
    pub(super) kernel: Vec<f32>,
    pub(super) bias: Vec<f32>,
}

/// Parameter gradients of one [`Dense`] layer.
#[derive(Debug, Clone)]
pub(super) struct DenseGrad {
    pub(super) kernel: Vec<f32>,
    pub(super) bias: Vec<f32>,
}

impl Dense {
    /// Glorot-uniform kernel, zero bias.
    #[expect(clippy::cast_precision_loss)]
    pub(super) fn glorot<R>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let limit = (6.0 / (in_dim + out_dim).max(1) as f32).sqrt();
        let kernel = (0..in_dim * out_dim)
            .map(|_| rng.random_range(-limit..=limit))
            .collect();
        Self {
            in_dim,
            out_dim,
            kernel,
            bias: vec![0.0; out_dim],
        }
    }

    pub(super) fn kernel_shape(&self) -> Vec<usize> {
        vec![self.in_dim, self.out_dim]
    }

    pub(super) fn bias_shape(&self) -> Vec<usize> {
        vec![self.out_dim]
    }

    pub(super) fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut output = self.bias.clone();
        for (x, row) in input.iter().zip(self.kernel.chunks_exact(self.out_dim)) {
            for (y, w) in output.iter_mut().zip(row) {
                *y += x * w;
            }
        }
        output
    }

    /// Given the layer input and the loss gradient w.r.t. the layer output,
    /// returns the parameter gradients and the gradient w.r.t. the input.
    pub(super) fn backward(&self, input: &[f32], grad_out: &[f32]) -> (DenseGrad, Vec<f32>) {
        let mut kernel = vec![0.0; self.kernel.len()];
        let mut grad_in = vec![0.0; self.in_dim];
        for (i, x) in input.iter().enumerate() {
            let row = i * self.out_dim..(i + 1) * self.out_dim;
            for ((g, w), d) in kernel[row.clone()]
                .iter_mut()
                .zip(&self.kernel[row])
                .zip(grad_out)
            {
                *g = x * d;
                grad_in[i] += w * d;
            }
        }
        let grad = DenseGrad {
            kernel,
            bias: grad_out.to_vec(),
        };
        (grad, grad_in)
    }

    pub(super) fn to_tensors(&self) -> [Tensor; 2] {
        [
            Tensor::new(self.kernel_shape(), self.kernel.clone()),
            Tensor::new(self.bias_shape(), self.bias.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_forward() {
        let layer = Dense {
            in_dim: 2,
            out_dim: 3,
            kernel: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            bias: vec![0.5, 0.0, -0.5],
        };
        assert_eq!(layer.forward(&[1.0, -1.0]), vec![-2.5, -3.0, -3.5]);
    }

    #[test]
    fn test_backward_matches_finite_difference() {
        let mut rng = Pcg32::seed_from_u64(4);
        let layer = Dense::glorot(3, 2, &mut rng);
        let input = [0.3, -0.7, 1.1];
        // loss = sum(output), so the output gradient is all ones
        let (grad, grad_in) = layer.backward(&input, &[1.0, 1.0]);
        fn loss(layer: &Dense, input: &[f32]) -> f32 {
            layer.forward(input).iter().sum()
        }

        let eps = 1e-2;
        for k in 0..layer.kernel.len() {
            let mut shifted = layer.clone();
            shifted.kernel[k] += eps;
            let numeric = (loss(&shifted, &input) - loss(&layer, &input)) / eps;
            assert!((numeric - grad.kernel[k]).abs() < 1e-2, "kernel {k}");
        }
        for i in 0..input.len() {
            let mut shifted = input;
            shifted[i] += eps;
            let numeric = (loss(&layer, &shifted) - loss(&layer, &input)) / eps;
            assert!((numeric - grad_in[i]).abs() < 1e-2, "input {i}");
        }
        assert_eq!(grad.bias, vec![1.0, 1.0]);
    }

    #[test]
    fn test_glorot_bounds() {
        let mut rng = Pcg32::seed_from_u64(0);
        let layer = Dense::glorot(24, 24, &mut rng);
        let limit = (6.0f32 / 48.0).sqrt();
        assert!(layer.kernel.iter().all(|w| w.abs() <= limit));
        assert!(layer.bias.iter().all(|b| *b == 0.0));
    }
}
