use reqwest::StatusCode;
use thiserror::Error;

/// Startup failures. Any of these stops the process before the prompt loop.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("the OPENAI_API_KEY environment variable is empty")]
    EmptyApiKey,

    #[error("OPENAI_API_KEY contains characters that cannot be sent in an HTTP header")]
    InvalidApiKey,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failure of a single turn. The chat loop reports it and keeps going.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider rejected the request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}
