use thiserror::Error;

/// Errors internal to paraphrase generation.
///
/// These never surface from [`crate::VariationGenerator::expand`], which
/// degrades to the original query instead; only construction can fail.
#[derive(Debug, Error)]
pub enum ExpansionError {
    /// Invalid generator configuration
    #[error("Invalid expansion configuration: {0}")]
    Configuration(String),

    /// Transport-level failure talking to the provider
    #[error("Paraphrase provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Paraphrase provider returned status {0}")]
    Provider(u16),

    /// Provider answered 2xx with no usable content
    #[error("Paraphrase provider returned no content")]
    EmptyResponse,
}
