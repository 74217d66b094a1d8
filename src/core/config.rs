//! Game configuration loaded from TOML
//!
//! Every section has defaults, so a missing `jutland.toml` simply means
//! "play with the stock settings". Command-line flags are applied on top
//! by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{JutlandError, Result};
use crate::fleet::Side;
use crate::turn::projector::ProjectionPolicy;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "jutland.toml";

/// Language model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Endpoint URL; `anthropic.com` selects the Anthropic message format,
    /// anything else is treated as OpenAI-compatible
    pub api_url: String,
    /// Model identifier passed through to the endpoint
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Upper bound on generated tokens per call
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            api_key_env: "LLM_API_KEY".into(),
            max_tokens: 4096,
        }
    }
}

/// Rules of play
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Where the running game is saved between turns
    pub state_path: PathBuf,
    /// Alternative starting scenario; the built-in one is used when unset
    pub seed_path: Option<PathBuf>,
    /// Side commanded by the language model
    pub ai_side: Side,
    /// Bounded wait for a single oracle call
    pub call_timeout_secs: u64,
    /// Refuse adjudications that raise a sunk ship
    pub strict_status: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("save/game_state.json"),
            seed_path: None,
            ai_side: Side::British,
            call_timeout_secs: 120,
            strict_status: false,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub llm: LlmConfig,
    pub game: GameSettings,
}

impl GameConfig {
    /// Parse a config document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check values the rest of the game relies on
    pub fn validate(&self) -> Result<()> {
        if self.game.call_timeout_secs == 0 {
            return Err(JutlandError::Config(
                "game.call_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(JutlandError::Config("llm.api_url must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(JutlandError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.game.call_timeout_secs)
    }

    pub fn projection_policy(&self) -> ProjectionPolicy {
        if self.game.strict_status {
            ProjectionPolicy::Strict
        } else {
            ProjectionPolicy::Permissive
        }
    }

    /// The side the human commands
    pub fn human_side(&self) -> Side {
        self.game.ai_side.opponent()
    }
}
