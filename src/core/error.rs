use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomeError {
    #[error("Device not found: {0}")]
    DeviceNotFound(crate::core::types::DeviceId),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, HomeError>;
