use thiserror::Error;

/// Errors that can occur during embedding operations
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Invalid client configuration
    #[error("Invalid embedding configuration: {0}")]
    Configuration(String),

    /// Transport-level failure talking to the provider
    #[error("Embedding provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Embedding provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// Provider answered 2xx but the body carried no embedding
    #[error("Embedding not found in provider response")]
    MissingEmbedding,
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;
