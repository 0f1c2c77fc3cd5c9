use std::fmt;

use serde::{Serialize, Deserialize};

use crate::error::{NnhsError, RangeKind, Result};
use crate::layers::dense::Layer;
use crate::network::metadata::Declaration;

/// A `(min, max)` pair used for min-max scaling of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Range {
        Range { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive on both ends.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// True unless `min < max` with a finite width. Zero-width, inverted and
    /// NaN ranges are all degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.min < self.max && self.width().is_finite())
    }

    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.min) / (self.max - self.min)
    }

    pub fn denormalize(&self, a: f64) -> f64 {
        a * (self.max - self.min) + self.min
    }
}

/// Raw, unvalidated pieces of a network. Turned into a [`NetworkModel`] by
/// [`NetworkModel::new`], which enforces every shape invariant, or by
/// `TryFrom`, which also rejects degenerate ranges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelParts {
    pub problem: String,
    #[serde(default)]
    pub inputs: Vec<Declaration>,
    #[serde(default)]
    pub outputs: Vec<Declaration>,
    pub input_range: Vec<Range>,
    pub output_range: Vec<Range>,
    pub layer_sizes: Vec<usize>,
    pub layers: Vec<Layer>,
}

/// Immutable, shape-checked feed-forward network.
///
/// Every plane transition `k` satisfies
/// `layers[k].weights.rows == layers[k].biases.len() == layer_sizes[k + 1]` and
/// `layers[k].weights.cols == layer_sizes[k]`. The first plane has
/// `num_inputs()` neurons and the last `num_outputs()`.
///
/// A model holds no interior mutability, so `&NetworkModel` can be shared
/// across threads for concurrent inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelParts", into = "ModelParts")]
pub struct NetworkModel {
    problem: String,
    inputs: Vec<Declaration>,
    outputs: Vec<Declaration>,
    input_variables: Vec<String>,
    output_variables: Vec<String>,
    input_range: Vec<Range>,
    output_range: Vec<Range>,
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
}

impl NetworkModel {
    pub fn new(parts: ModelParts) -> Result<NetworkModel> {
        let ModelParts { problem, inputs, outputs, input_range, output_range, layer_sizes, layers } = parts;

        if input_range.is_empty() {
            return Err(NnhsError::InvalidModel("network declares no inputs".into()));
        }
        if output_range.is_empty() {
            return Err(NnhsError::InvalidModel("network declares no outputs".into()));
        }
        if layer_sizes.len() < 2 {
            return Err(NnhsError::InvalidModel(format!(
                "network needs at least 2 planes, got {}",
                layer_sizes.len()
            )));
        }
        if let Some(pos) = layer_sizes.iter().position(|&s| s == 0) {
            return Err(NnhsError::InvalidModel(format!("plane {pos} has no neurons")));
        }
        if layer_sizes[0] != input_range.len() {
            return Err(NnhsError::InvalidModel(format!(
                "first plane has {} neurons but {} input ranges are given",
                layer_sizes[0],
                input_range.len()
            )));
        }
        let last = layer_sizes[layer_sizes.len() - 1];
        if last != output_range.len() {
            return Err(NnhsError::InvalidModel(format!(
                "last plane has {} neurons but {} output ranges are given",
                last,
                output_range.len()
            )));
        }
        if layers.len() != layer_sizes.len() - 1 {
            return Err(NnhsError::InvalidModel(format!(
                "{} planes need {} transitions, got {}",
                layer_sizes.len(),
                layer_sizes.len() - 1,
                layers.len()
            )));
        }
        for (k, layer) in layers.iter().enumerate() {
            layer.check_shape()?;
            if layer.size() != layer_sizes[k + 1] || layer.input_size() != layer_sizes[k] {
                return Err(NnhsError::InvalidModel(format!(
                    "transition {k} is {}x{}, planes require {}x{}",
                    layer.size(),
                    layer.input_size(),
                    layer_sizes[k + 1],
                    layer_sizes[k]
                )));
            }
        }

        Ok(NetworkModel {
            input_variables: inputs.iter().map(|d| d.name.clone()).collect(),
            output_variables: outputs.iter().map(|d| d.name.clone()).collect(),
            problem,
            inputs,
            outputs,
            input_range,
            output_range,
            layer_sizes,
            layers,
        })
    }

    /// Fails with `DegenerateRange` on the first input, then output, range that
    /// is not strictly increasing with a finite width.
    pub fn check_ranges(&self) -> Result<()> {
        let sides = [(RangeKind::Input, &self.input_range), (RangeKind::Output, &self.output_range)];
        for (kind, ranges) in sides {
            if let Some(index) = ranges.iter().position(Range::is_degenerate) {
                let r = ranges[index];
                return Err(NnhsError::DegenerateRange { kind, index, min: r.min, max: r.max });
            }
        }
        Ok(())
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn output_variables(&self) -> &[String] {
        &self.output_variables
    }

    pub fn num_inputs(&self) -> usize {
        self.input_range.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.output_range.len()
    }

    pub fn input_range(&self) -> &[Range] {
        &self.input_range
    }

    pub fn output_range(&self) -> &[Range] {
        &self.output_range
    }

    /// Neurons per plane, input and output planes included.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn num_planes(&self) -> usize {
        self.layer_sizes.len()
    }

    /// The `num_planes() - 1` transitions, input side first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Full declaration lines, inputs first.
    pub fn info(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .map(|d| d.line.as_str())
            .collect()
    }

    /// Plane sizes joined with `x`, e.g. `2x4x1`.
    pub fn topology(&self) -> String {
        self.layer_sizes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("x")
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model written by `save_json`. Shape and range checks run
    /// again, so a hand-edited file with a degenerate range is rejected.
    pub fn load_json(path: &str) -> Result<NetworkModel> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TryFrom<ModelParts> for NetworkModel {
    type Error = NnhsError;

    /// Used by deserialization: shape checks, then range checks.
    fn try_from(parts: ModelParts) -> Result<NetworkModel> {
        let model = NetworkModel::new(parts)?;
        model.check_ranges()?;
        Ok(model)
    }
}

impl From<NetworkModel> for ModelParts {
    fn from(model: NetworkModel) -> ModelParts {
        ModelParts {
            problem: model.problem,
            inputs: model.inputs,
            outputs: model.outputs,
            input_range: model.input_range,
            output_range: model.output_range,
            layer_sizes: model.layer_sizes,
            layers: model.layers,
        }
    }
}

impl fmt::Display for NetworkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.problem.trim(), self.topology())
    }
}

/// Declared input and output variable names, in descriptor order.
pub fn describe(model: &NetworkModel) -> (&[String], &[String]) {
    (model.input_variables(), model.output_variables())
}
