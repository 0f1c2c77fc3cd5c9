pub mod metadata;
pub mod model;

pub use metadata::{Declaration, Direction};
pub use model::{describe, ModelParts, NetworkModel, Range};
