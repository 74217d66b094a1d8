use thiserror::Error;

use crate::llm::oracle::CallError;

#[derive(Error, Debug)]
pub enum JutlandError {
    #[error("Oracle call failed: {0}")]
    Oracle(#[from] CallError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("The game is over; no further turns can be played")]
    GameOver,
}

pub type Result<T> = std::result::Result<T, JutlandError>;
