//! Action-value approximators.
//!
//! An [`Approximator`] maps a state vector to one estimate per action and can
//! be nudged towards a target vector by a single gradient step. Parameters are
//! exchanged as a [`WeightsBlob`], an ordered list of named-shape tensors that
//! round-trips through JSON.

use serde::{Deserialize, Serialize};

pub use self::{adam::AdamConfig, mlp::*};

mod adam;
mod dense;
mod mlp;

/// Maps state vectors to per-action estimates.
pub trait Approximator: std::fmt::Debug + Send {
    /// Expected state vector length.
    fn input_len(&self) -> usize;

    /// Number of estimates produced (the action set arity).
    fn output_len(&self) -> usize;

    /// Estimates one value per action.
    fn predict(&self, state: &[f32]) -> Vec<f32>;

    /// Takes one optimization step towards `target` and returns the squared
    /// error measured before the step.
    fn fit(&mut self, state: &[f32], target: &[f32]) -> f32;

    /// Exports the parameters.
    fn save(&self) -> WeightsBlob;

    /// Replaces the parameters, leaving them untouched when the blob does not
    /// match this model's layout.
    fn load(&mut self, blob: &WeightsBlob) -> Result<(), LoadWeightsError>;
}

/// One parameter tensor, flattened in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Tensor {
    #[must_use]
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self { shape, data }
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Serialized approximator parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightsBlob {
    pub tensors: Vec<Tensor>,
}

impl WeightsBlob {
    #[must_use]
    pub fn new(tensors: Vec<Tensor>) -> Self {
        Self { tensors }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Checks the blob against an expected list of shapes.
    pub fn check_layout(&self, expected: &[Vec<usize>]) -> Result<(), LoadWeightsError> {
        if self.tensors.len() != expected.len() {
            return Err(LoadWeightsError::TensorCount {
                expected: expected.len(),
                found: self.tensors.len(),
            });
        }
        for (index, (tensor, shape)) in self.tensors.iter().zip(expected).enumerate() {
            if &tensor.shape != shape {
                return Err(LoadWeightsError::ShapeMismatch {
                    index,
                    expected: shape.clone(),
                    found: tensor.shape.clone(),
                });
            }
            if tensor.data.len() != tensor.element_count() {
                return Err(LoadWeightsError::DataLength {
                    index,
                    expected: tensor.element_count(),
                    found: tensor.data.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LoadWeightsError {
    #[display("expected {expected} tensors, found {found}")]
    TensorCount { expected: usize, found: usize },
    #[display("tensor {index}: expected shape {expected:?}, found {found:?}")]
    ShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[display("tensor {index}: shape holds {expected} values, data has {found}")]
    DataLength {
        index: usize,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> WeightsBlob {
        WeightsBlob::new(vec![
            Tensor::new(vec![2, 3], vec![0.0; 6]),
            Tensor::new(vec![3], vec![1.0, 2.0, 3.0]),
        ])
    }

    #[test]
    fn test_check_layout() {
        let blob = blob();
        assert!(blob.check_layout(&[vec![2, 3], vec![3]]).is_ok());
        assert_eq!(
            blob.check_layout(&[vec![2, 3]]),
            Err(LoadWeightsError::TensorCount {
                expected: 1,
                found: 2
            })
        );
        assert!(matches!(
            blob.check_layout(&[vec![3, 2], vec![3]]),
            Err(LoadWeightsError::ShapeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_short_data_is_rejected() {
        let mut blob = blob();
        blob.tensors[1].data.pop();
        assert!(matches!(
            blob.check_layout(&[vec![2, 3], vec![3]]),
            Err(LoadWeightsError::DataLength {
                index: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_json_is_a_list_of_tensors() {
        let json = serde_json::to_value(blob()).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["shape"], serde_json::json!([2, 3]));
        let back: WeightsBlob = serde_json::from_value(json).unwrap();
        assert_eq!(back, blob());
    }
}
