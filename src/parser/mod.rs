pub mod descriptor;
pub mod load_config;

pub use descriptor::{load_model, load_model_with, parse_reader, parse_str};
pub use load_config::LoadConfig;
