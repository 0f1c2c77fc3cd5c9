use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationMode;

/// Configuration for an [`InferenceEngine`](super::InferenceEngine).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// How the clamped sigmoid is evaluated.
    pub activation: ActivationMode,
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activation(mut self, mode: ActivationMode) -> Self {
        self.activation = mode;
        self
    }

    /// Shorthand for the tabulated sigmoid.
    pub fn fast() -> Self {
        Self::default().with_activation(ActivationMode::Tabulated)
    }
}
