use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvoError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Poster lookup error: {0}")]
    Lookup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ConvoError {
    /// True for failures raised while talking to the model endpoint.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(self, Self::Llm(_) | Self::Http(_) | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvoError>;
