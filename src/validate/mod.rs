pub mod counters;
pub mod range;

pub use counters::{OutOfRangeReport, RangeCounters};
pub use range::{check_range, RangeValidator};
