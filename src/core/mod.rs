pub mod config;
pub mod error;

pub use config::GameConfig;
pub use error::{JutlandError, Result};
