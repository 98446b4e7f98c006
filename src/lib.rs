use anyhow::Result;
use colored::*;
use dotenvy::dotenv;

pub mod api;
pub mod config;
pub mod error;
pub mod interface;
pub mod logger;
pub mod utils;

/// Run the application: load `.env`, read the environment, and start the chat loop.
///
/// A [`ConfigError`] is returned before any prompt is shown when the API key
/// is unusable; the caller decides how to report it.
pub async fn run() -> Result<()> {
    // Load environment variables from .env
    dotenv().ok();

    let config = AppConfig::from_env()?;
    let client = OpenAiClient::new(&config)?;

    let logger = match Logger::new(&config.log_dir) {
        Ok(logger) => logger,
        Err(e) => {
            println!("{} {}", "⚠️  Session logging disabled:".yellow(), e);
            Logger::disabled()
        }
    };
    let _ = logger.log_session_start(client.model(), client.url());

    let input = interface::TerminalInput::new()?;
    let mut session = ChatSession::new(client, input, std::io::stdout(), logger);
    session.run().await
}

// Re-exports for library consumers: common useful types
pub use api::{Completion, OpenAiClient};
pub use config::AppConfig;
pub use error::{ChatError, ConfigError};
pub use interface::ChatSession;
pub use logger::Logger;
