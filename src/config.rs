use crate::error::ConfigError;
use std::path::PathBuf;

/// Model every completion request targets.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const APP_NAME: &str = "ai-shell";

/// Process-wide settings, read once from the environment at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub log_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match lookup("OPENAI_API_KEY") {
            None => return Err(ConfigError::MissingApiKey),
            Some(key) if key.trim().is_empty() => return Err(ConfigError::EmptyApiKey),
            Some(key) => key,
        };

        let base_url = lookup("OPENAI_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            log_dir: resolve_log_dir(&lookup),
        })
    }

    /// Full URL of the chat-completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// `AI_SHELL_LOG_DIR` -> `AI_SHELL_DATA_DIR/logs` -> platform data dir -> `./logs`.
fn resolve_log_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("AI_SHELL_LOG_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = lookup("AI_SHELL_DATA_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("logs");
    }
    match dirs::data_dir() {
        Some(data) => data.join(APP_NAME).join("logs"),
        None => PathBuf::from("logs"),
    }
}
