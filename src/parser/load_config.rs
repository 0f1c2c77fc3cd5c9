use serde::{Serialize, Deserialize};

/// Options for reading a model descriptor.
///
/// # Fields
/// - `reject_degenerate_ranges` — fail the load when any input or output range
///                                is not strictly increasing (`min < max` with a
///                                finite width). When `false` such models load
///                                with a warning and inference reports the
///                                offending input feature at first use.
/// - `strict_declarations`      — require exactly `numInputs` `input` lines and
///                                `numOutputs` `output` lines in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    pub reject_degenerate_ranges: bool,
    pub strict_declarations: bool,
}

impl LoadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_degenerate_ranges_allowed(mut self) -> Self {
        self.reject_degenerate_ranges = false;
        self
    }

    pub fn with_strict_declarations(mut self) -> Self {
        self.strict_declarations = true;
        self
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            reject_degenerate_ranges: true,
            strict_declarations: false,
        }
    }
}
