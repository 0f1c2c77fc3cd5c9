use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnhsError>;

#[derive(Error, Debug)]
pub enum NnhsError {
    #[error("cannot open model descriptor {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("degenerate {kind} range for feature {index}: min = {min}, max = {max}")]
    DegenerateRange {
        kind: RangeKind,
        index: usize,
        min: f64,
        max: f64,
    },

    #[error("dimension mismatch: expected {expected} {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of the network a range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Input,
    Output,
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeKind::Input => write!(f, "input"),
            RangeKind::Output => write!(f, "output"),
        }
    }
}

/// Part of the descriptor a [`FormatError`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Description,
    Declarations,
    InputRanges,
    OutputRanges,
    PlaneMarker,
    PlaneSizes,
    BiasBlock(usize),
    WeightBlock(usize),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Description => write!(f, "problem description"),
            Section::Declarations => write!(f, "variable declarations"),
            Section::InputRanges => write!(f, "input ranges"),
            Section::OutputRanges => write!(f, "output ranges"),
            Section::PlaneMarker => write!(f, "'$' plane marker"),
            Section::PlaneSizes => write!(f, "plane sizes"),
            Section::BiasBlock(k) => write!(f, "bias block {k}"),
            Section::WeightBlock(k) => write!(f, "weight block {k}"),
        }
    }
}

/// Structural violation found while reading a descriptor.
///
/// `line` is 1-based. `found` holds the offending text, or `"end of file"`
/// when the descriptor stopped early.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: malformed {section}: expected {expected}, found {found:?}")]
pub struct FormatError {
    pub line: usize,
    pub section: Section,
    pub expected: String,
    pub found: String,
}

impl FormatError {
    pub fn new(line: usize, section: Section, expected: impl Into<String>, found: impl Into<String>) -> Self {
        FormatError {
            line,
            section,
            expected: expected.into(),
            found: found.into(),
        }
    }
}
