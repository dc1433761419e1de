use thiserror::Error;

/// Failure while talking to the forecast API or decoding its answer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach forecast API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse forecast response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A coordinate typed at the prompt that is not a usable number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} should be a number")]
pub struct InputError {
    pub field: &'static str,
    pub input: String,
}
