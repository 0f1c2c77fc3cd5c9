use serde::{Serialize, Deserialize};

/// Pre-activations are clamped to `[-CLAMP_LIMIT, CLAMP_LIMIT]` before the sigmoid.
pub const CLAMP_LIMIT: f64 = 10.0;

/// Number of entries in the tabulated sigmoid.
pub const TABLE_SIZE: usize = 100_000;

/// Logistic function `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Clamps a pre-activation into `[-CLAMP_LIMIT, CLAMP_LIMIT]`. NaN passes through.
pub fn clamp_pre_activation(x: f64) -> f64 {
    x.clamp(-CLAMP_LIMIT, CLAMP_LIMIT)
}

/// How the sigmoid is evaluated once the argument has been clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationMode {
    /// Closed-form `1 / (1 + e^-x)`.
    #[default]
    Exact,
    /// Lookup in a table of `TABLE_SIZE` cell-centred samples over the clamp
    /// interval. Faster, accurate to about half a cell (~1e-4 in x).
    Tabulated,
}

/// Clamped sigmoid used by every layer of the network.
#[derive(Debug, Clone, Default)]
pub enum Activation {
    #[default]
    Exact,
    Tabulated(SigmoidTable),
}

impl Activation {
    pub fn new(mode: ActivationMode) -> Activation {
        match mode {
            ActivationMode::Exact => Activation::Exact,
            ActivationMode::Tabulated => Activation::Tabulated(SigmoidTable::new()),
        }
    }

    pub fn mode(&self) -> ActivationMode {
        match self {
            Activation::Exact => ActivationMode::Exact,
            Activation::Tabulated(_) => ActivationMode::Tabulated,
        }
    }

    /// Clamps `z` first, then applies the sigmoid.
    pub fn function(&self, z: f64) -> f64 {
        let z = clamp_pre_activation(z);
        match self {
            Activation::Exact => sigmoid(z),
            Activation::Tabulated(table) => table.lookup(z),
        }
    }

    /// Derivative of `function` at the unclamped pre-activation `z`, given the
    /// already computed output `a = function(z)`. Zero where the clamp is active.
    pub fn derivative(&self, z: f64, a: f64) -> f64 {
        if !(-CLAMP_LIMIT..=CLAMP_LIMIT).contains(&z) {
            return 0.0;
        }
        a * (1.0 - a)
    }
}

/// Tabulated sigmoid over `[-CLAMP_LIMIT, CLAMP_LIMIT]`.
///
/// Entry `i` holds `sigmoid(-CLAMP_LIMIT + (i + 0.5) * delta)` with
/// `delta = 2 * CLAMP_LIMIT / (TABLE_SIZE - 1)`.
#[derive(Debug, Clone)]
pub struct SigmoidTable {
    values: Vec<f64>,
    rec_delta: f64,
}

impl SigmoidTable {
    pub fn new() -> SigmoidTable {
        let delta = (2.0 * CLAMP_LIMIT) / (TABLE_SIZE as f64 - 1.0);
        let mut x = -CLAMP_LIMIT + 0.5 * delta;
        let mut values = Vec::with_capacity(TABLE_SIZE);
        for _ in 0..TABLE_SIZE {
            values.push(sigmoid(x));
            x += delta;
        }
        SigmoidTable { values, rec_delta: 1.0 / delta }
    }

    pub fn lookup(&self, x: f64) -> f64 {
        // `as usize` saturates negatives and NaN to 0.
        let index = ((x + CLAMP_LIMIT) * self.rec_delta) as usize;
        self.values[index.min(TABLE_SIZE - 1)]
    }
}

impl Default for SigmoidTable {
    fn default() -> Self {
        SigmoidTable::new()
    }
}
