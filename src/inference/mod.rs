pub mod config;
pub mod engine;

pub use config::InferenceConfig;
pub use engine::{forward, InferenceEngine, JacobianOutput};
