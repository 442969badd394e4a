pub mod config;
pub mod error;
pub mod types;

pub use config::{HomeConfig, LlmConfig};
pub use error::{HomeError, Result};
