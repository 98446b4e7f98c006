use crate::utils::{ensure_dir, truncate};
use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only session log. One file per process run.
///
/// A disabled logger accepts every call and writes nothing, so the chat
/// loop never has to care whether the log directory was usable.
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    pub fn new(log_dir: &Path) -> Result<Self> {
        ensure_dir(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = log_dir.join(format!("session_{}.log", timestamp));

        Ok(Self {
            log_file: Some(log_file),
        })
    }

    pub fn disabled() -> Self {
        Self { log_file: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let Some(path) = &self.log_file else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    pub fn log_session_start(&self, model: &str, endpoint: &str) -> Result<()> {
        self.log(&format!("SESSION START: model={} endpoint={}", model, endpoint))
    }

    pub fn log_api_request(&self, prompt: &str) -> Result<()> {
        self.log(&format!("API REQUEST: {}", prompt))
    }

    pub fn log_api_response(&self, response: &str) -> Result<()> {
        self.log(&format!("API RESPONSE: {}", truncate(response, 200)))
    }

    pub fn log_error(&self, error: &str) -> Result<()> {
        self.log(&format!("ERROR: {}", error))
    }
}
