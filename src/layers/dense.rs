use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::Activation};
use crate::error::{NnhsError, Result};

/// One fully connected transition between two planes.
///
/// `weights` has one row per destination neuron and one column per source
/// neuron; `biases` has one entry per destination neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl Layer {
    pub fn new(weights: Matrix, biases: Vec<f64>) -> Result<Layer> {
        let layer = Layer { weights, biases };
        layer.check_shape()?;
        Ok(layer)
    }

    /// Number of destination neurons.
    pub fn size(&self) -> usize {
        self.weights.rows
    }

    /// Number of source neurons.
    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub(crate) fn check_shape(&self) -> Result<()> {
        if !self.weights.is_consistent() {
            return Err(NnhsError::InvalidModel(format!(
                "weight matrix declares {}x{} but holds ragged data",
                self.weights.rows, self.weights.cols
            )));
        }
        if self.biases.len() != self.weights.rows {
            return Err(NnhsError::InvalidModel(format!(
                "bias vector has {} entries but weight matrix has {} rows",
                self.biases.len(),
                self.weights.rows
            )));
        }
        Ok(())
    }

    /// `z = biases + weights · input`.
    pub fn pre_activation(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .mul_vec(input)
            .into_iter()
            .zip(&self.biases)
            .map(|(wx, b)| b + wx)
            .collect()
    }

    pub fn feed_from(&self, input: &[f64], activator: &Activation) -> Vec<f64> {
        self.pre_activation(input)
            .into_iter()
            .map(|z| activator.function(z))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::sigmoid;

    #[test]
    fn pre_activation_adds_bias_to_weighted_sum() {
        let layer = Layer::new(
            Matrix::from_data(vec![vec![1.0, 2.0], vec![-1.0, 0.5]]),
            vec![0.5, -1.0],
        )
        .unwrap();
        assert_eq!(layer.pre_activation(&[1.0, 1.0]), vec![3.5, -1.5]);
        assert_eq!(layer.size(), 2);
        assert_eq!(layer.input_size(), 2);
    }

    #[test]
    fn feed_from_clamps_before_sigmoid() {
        let layer = Layer::new(Matrix::from_data(vec![vec![100.0]]), vec![0.0]).unwrap();
        assert_eq!(layer.feed_from(&[1.0], &Activation::Exact), vec![sigmoid(10.0)]);
    }

    #[test]
    fn bias_length_must_match_rows() {
        let err = Layer::new(Matrix::zeros(3, 2), vec![0.0; 2]).unwrap_err();
        assert!(matches!(err, NnhsError::InvalidModel(_)));
    }
}
