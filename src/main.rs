use ai_shell::ConfigError;
use colored::*;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match ai_shell::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(config_err) = e.downcast_ref::<ConfigError>() {
                eprintln!("{} {}", "✗ Error initializing OpenAI client:".red().bold(), config_err);
                eprintln!(
                    "{}",
                    "OpenAI API Key not found. Please ensure your OPENAI_API_KEY environment variable is set. Exiting..."
                        .yellow()
                );
            } else {
                eprintln!("{} {:#}", "✗ Fatal error:".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}
