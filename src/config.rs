//! Runtime configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `DATA_DIR` | `data` |
//! | `PORT` | `3000` |
//! | `POLISH_API_KEY` (or `OPENAI_API_KEY`) | unset: no polishing |
//! | `POLISH_ENDPOINT` | OpenAI chat completions URL |
//! | `POLISH_MODEL` | `gpt-4o-mini` |
//! | `POLISH_TIMEOUT_SECS` | `10` |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POLISH_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_POLISH_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_POLISH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub polish: PolishConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolishConfig {
    /// No key means polishing is disabled
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable numbers fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let port = non_empty("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = non_empty("POLISH_TIMEOUT_SECS")
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(DEFAULT_POLISH_TIMEOUT_SECS);

        let polish = PolishConfig {
            api_key: non_empty("POLISH_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            endpoint: non_empty("POLISH_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_POLISH_ENDPOINT.to_string()),
            model: non_empty("POLISH_MODEL").unwrap_or_else(|| DEFAULT_POLISH_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Self {
            data_dir,
            port,
            polish,
        }
    }
}

impl PolishConfig {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
