use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NnhsError, RangeKind, Result};
use crate::inference::config::InferenceConfig;
use crate::math::matrix::Matrix;
use crate::network::model::NetworkModel;

/// Outputs plus the `num_outputs x num_inputs` matrix of partial derivatives
/// `d outputs[i] / d features[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JacobianOutput {
    pub outputs: Vec<f64>,
    pub jacobian: Matrix,
}

/// Stateless forward pass over a shared [`NetworkModel`].
///
/// The engine only holds the activation (and its lookup table in tabulated
/// mode), so one engine can serve any number of models and threads.
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    activator: Activation,
}

impl InferenceEngine {
    pub fn new(config: &InferenceConfig) -> InferenceEngine {
        InferenceEngine { activator: Activation::new(config.activation) }
    }

    pub fn config(&self) -> InferenceConfig {
        InferenceConfig { activation: self.activator.mode() }
    }

    /// Min-max scales raw features into the input plane.
    ///
    /// Fails with `DegenerateRange` for the first feature whose range is not
    /// strictly increasing with a finite width, instead of producing NaN,
    /// infinity or a silently mirrored input.
    pub fn normalize(model: &NetworkModel, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != model.num_inputs() {
            return Err(NnhsError::DimensionMismatch {
                what: "input features",
                expected: model.num_inputs(),
                actual: features.len(),
            });
        }
        features
            .iter()
            .zip(model.input_range())
            .enumerate()
            .map(|(index, (&x, range))| {
                if range.is_degenerate() {
                    return Err(NnhsError::DegenerateRange {
                        kind: RangeKind::Input,
                        index,
                        min: range.min,
                        max: range.max,
                    });
                }
                Ok(range.normalize(x))
            })
            .collect()
    }

    /// Normalize, propagate through every transition (clamp to `[-10, 10]`,
    /// then sigmoid), and denormalize against the output ranges.
    ///
    /// Features outside their input range are extrapolated, not rejected.
    pub fn forward(&self, model: &NetworkModel, features: &[f64]) -> Result<Vec<f64>> {
        let mut act = Self::normalize(model, features)?;
        for layer in model.layers() {
            act = layer.feed_from(&act, &self.activator);
        }
        Ok(denormalize(model, &act))
    }

    /// Activation of every plane, starting with the normalized input plane and
    /// ending with the last plane before denormalization.
    pub fn activations(&self, model: &NetworkModel, features: &[f64]) -> Result<Vec<Vec<f64>>> {
        let mut planes = Vec::with_capacity(model.num_planes());
        planes.push(Self::normalize(model, features)?);
        for layer in model.layers() {
            let next = layer.feed_from(&planes[planes.len() - 1], &self.activator);
            planes.push(next);
        }
        Ok(planes)
    }

    /// Forward pass that also propagates the derivatives of each plane with
    /// respect to the raw input features.
    pub fn forward_with_jacobian(&self, model: &NetworkModel, features: &[f64]) -> Result<JacobianOutput> {
        let mut act = Self::normalize(model, features)?;
        let input_scale: Vec<f64> = model.input_range().iter().map(|r| 1.0 / r.width()).collect();
        let mut d_act = Matrix::diagonal(&input_scale);

        for layer in model.layers() {
            let z = layer.pre_activation(&act);
            let next: Vec<f64> = z.iter().map(|&z| self.activator.function(z)).collect();
            let slope: Vec<f64> = z
                .iter()
                .zip(&next)
                .map(|(&z, &a)| self.activator.derivative(z, a))
                .collect();
            d_act = (&layer.weights * &d_act).scale_rows(&slope);
            act = next;
        }

        let output_scale: Vec<f64> = model.output_range().iter().map(|r| r.width()).collect();
        Ok(JacobianOutput {
            outputs: denormalize(model, &act),
            jacobian: d_act.scale_rows(&output_scale),
        })
    }

    /// Tangent-linear response: for each output `i`, the directional
    /// derivative of `outputs[i]` along `perturbations[i]`, a vector in raw
    /// feature units.
    ///
    /// `perturbations` needs one row per output, each `num_inputs()` long.
    pub fn forward_tangent_linear(
        &self,
        model: &NetworkModel,
        features: &[f64],
        perturbations: &[Vec<f64>],
    ) -> Result<Vec<f64>> {
        if perturbations.len() != model.num_outputs() {
            return Err(NnhsError::DimensionMismatch {
                what: "perturbation rows",
                expected: model.num_outputs(),
                actual: perturbations.len(),
            });
        }
        if let Some(row) = perturbations.iter().find(|row| row.len() != model.num_inputs()) {
            return Err(NnhsError::DimensionMismatch {
                what: "perturbation entries",
                expected: model.num_inputs(),
                actual: row.len(),
            });
        }

        let JacobianOutput { jacobian, .. } = self.forward_with_jacobian(model, features)?;
        Ok(jacobian
            .data
            .iter()
            .zip(perturbations)
            .map(|(grad, dx)| grad.iter().zip(dx).map(|(g, d)| g * d).sum())
            .collect())
    }
}

fn denormalize(model: &NetworkModel, act: &[f64]) -> Vec<f64> {
    act.iter()
        .zip(model.output_range())
        .map(|(&a, range)| range.denormalize(a))
        .collect()
}

/// Forward pass with the exact clamped sigmoid.
pub fn forward(model: &NetworkModel, features: &[f64]) -> Result<Vec<f64>> {
    InferenceEngine::default().forward(model, features)
}
