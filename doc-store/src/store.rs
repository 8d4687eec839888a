use crate::document::{BotDefinition, QaDocument};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A raw vector-similarity hit, before any modality scaling
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// The document found
    pub document: QaDocument,

    /// Native similarity score (0.0 to 1.0, higher is better)
    pub similarity: f32,
}

/// A raw lexical-relevance hit, before any modality scaling
#[derive(Debug, Clone)]
pub struct TextHit {
    /// The document found
    pub document: QaDocument,

    /// Native lexical relevance metric (unbounded, higher is better)
    pub relevance: f32,
}

/// Storage interface the retrieval engine runs against.
///
/// Implementations return native scores; quality floors and scaling are the
/// retrievers' responsibility. "No matches" is an empty list — errors are
/// reserved for transport and auth faults. Filters arrive already translated
/// to the store's `$`-prefixed operator vocabulary.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Top `limit` documents for one bot by similarity to `query_vector`
    async fn vector_search(
        &self,
        query_vector: &[f32],
        bot_id: &str,
        limit: usize,
        filter: &Value,
    ) -> Result<Vec<VectorHit>>;

    /// Top `limit` documents for one bot by lexical relevance to `query`
    async fn text_search(
        &self,
        query: &str,
        bot_id: &str,
        limit: usize,
        filter: &Value,
    ) -> Result<Vec<TextHit>>;

    /// Per-bot search configuration, if the bot exists
    async fn bot_definition(&self, bot_id: &str) -> Result<Option<BotDefinition>>;
}
