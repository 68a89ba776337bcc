//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default judge model.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Survey configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Judge credential. `None` is not a startup error; every judge call
    /// then fails closed with a diagnostic.
    pub api_key: Option<SecretString>,
    /// Model used by the judge.
    pub model: String,
    /// Base URL of the chat-completions API.
    pub api_base: String,
    /// Upper bound on a single judge round trip.
    pub judge_timeout: Duration,
    /// Directory the two export artifacts are written to.
    pub output_dir: PathBuf,
    /// Serve the HTTP surface on this port instead of the CLI REPL.
    pub http_port: Option<u16>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            judge_timeout: Duration::from_secs(60),
            output_dir: PathBuf::from("."),
            http_port: None,
        }
    }
}

impl SurveyConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let model = lookup("CX_SURVEY_MODEL").unwrap_or(defaults.model);

        let api_base = lookup("CX_SURVEY_API_BASE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let judge_timeout = match lookup("CX_SURVEY_JUDGE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CX_SURVEY_JUDGE_TIMEOUT_SECS".to_string(),
                    message: format!("expected whole seconds, got {raw:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "CX_SURVEY_JUDGE_TIMEOUT_SECS".to_string(),
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.judge_timeout,
        };

        let output_dir = lookup("CX_SURVEY_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let http_port = match lookup("CX_SURVEY_HTTP_PORT") {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "CX_SURVEY_HTTP_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?),
            None => None,
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            judge_timeout,
            output_dir,
            http_port,
        })
    }
}
