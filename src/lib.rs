pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod parser;
pub mod inference;
pub mod validate;

// Convenience re-exports
pub use error::{FormatError, NnhsError, RangeKind, Result, Section};
pub use math::matrix::Matrix;
pub use activation::activation::{Activation, ActivationMode};
pub use layers::dense::Layer;
pub use network::{describe, ModelParts, NetworkModel, Range};
pub use parser::{load_model, load_model_with, parse_reader, parse_str, LoadConfig};
pub use inference::{forward, InferenceConfig, InferenceEngine, JacobianOutput};
pub use validate::{check_range, OutOfRangeReport, RangeCounters, RangeValidator};
