//! Natural language command interpretation backed by a hosted model

pub mod client;
pub mod context;
pub mod parser;
pub mod schema;
pub mod service;

pub use client::LlmClient;
pub use parser::{interpret, interpret_command};
pub use service::{GenerationRequest, GenerationService};
