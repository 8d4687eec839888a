use crate::config::RetrievalConfig;
use crate::error::Result;
use async_trait::async_trait;
use kbsearch_doc_store::{Candidate, DocStore};
use kbsearch_embeddings::{EmbeddingClient, EmbeddingError};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// One retrieval call's inputs, request-scoped and immutable
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// Query text (a single variation when issued by the fusion engine)
    pub query: String,

    /// Bot (tenant) whose corpus is searched
    pub bot_id: String,

    /// Maximum number of candidates to return
    pub limit: usize,

    /// Translated filter predicate, `{}` when unfiltered
    pub filter: Value,

    /// Embedding model for vector-dependent retrievers
    pub embedding_model: Option<String>,
}

impl RetrievalRequest {
    /// Create an unfiltered request
    pub fn new(query: impl Into<String>, bot_id: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            bot_id: bot_id.into(),
            limit,
            filter: Value::Object(serde_json::Map::new()),
            embedding_model: None,
        }
    }

    /// Copy of this request with a different query text
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self.clone()
        }
    }
}

/// Retrieval capability chosen per request and injected into the fusion
/// engine: one operation, three implementations (vector, text, hybrid).
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Execute one query string against one bot's corpus.
    ///
    /// "No matches" is `Ok(vec![])`; errors are reserved for collaborator
    /// transport/auth faults.
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>>;
}

/// Source of normalized query embeddings.
///
/// Seam for tests; production code injects [`EmbeddingClient`].
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed_query(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> std::result::Result<Vec<f32>, EmbeddingError>;
}

#[async_trait]
impl QueryEmbedder for EmbeddingClient {
    async fn embed_query(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> std::result::Result<Vec<f32>, EmbeddingError> {
        EmbeddingClient::embed_query(self, text, model).await
    }
}

/// Vector-similarity retriever with a hard similarity floor.
///
/// Candidates below the floor are excluded entirely, not deprioritized.
pub struct VectorRetriever {
    store: Arc<dyn DocStore>,
    embedder: Arc<dyn QueryEmbedder>,
    config: RetrievalConfig,
}

impl VectorRetriever {
    /// Create a new vector retriever
    pub fn new(
        store: Arc<dyn DocStore>,
        embedder: Arc<dyn QueryEmbedder>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>> {
        let query_vector = self
            .embedder
            .embed_query(&request.query, request.embedding_model.as_deref())
            .await?;

        let hits = self
            .store
            .vector_search(
                &query_vector,
                &request.bot_id,
                request.limit,
                &request.filter,
            )
            .await?;

        let floor = self.config.vector_similarity_floor;
        let candidates: Vec<Candidate> = hits
            .into_iter()
            .filter(|hit| hit.similarity >= floor)
            .map(|hit| {
                let mut candidate = Candidate::from_document(hit.document);
                candidate.vector_score = hit.similarity;
                candidate.text_score = 0.0;
                candidate.score = hit.similarity;
                candidate
            })
            .collect();

        debug!(
            "Vector retrieval for '{}' kept {} candidates above floor {floor}",
            request.query,
            candidates.len()
        );
        Ok(candidates)
    }
}

/// Lexical text retriever.
///
/// The store's native relevance metric is halved to bring it into a range
/// comparable with the other modalities; there is no absolute floor.
pub struct TextRetriever {
    store: Arc<dyn DocStore>,
    config: RetrievalConfig,
}

impl TextRetriever {
    /// Create a new text retriever
    pub fn new(store: Arc<dyn DocStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl Retriever for TextRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>> {
        let hits = self
            .store
            .text_search(
                &request.query,
                &request.bot_id,
                request.limit,
                &request.filter,
            )
            .await?;

        let divisor = self.config.text_score_divisor;
        let candidates: Vec<Candidate> = hits
            .into_iter()
            .map(|hit| {
                let scaled = hit.relevance / divisor;
                let mut candidate = Candidate::from_document(hit.document);
                candidate.text_score = scaled;
                candidate.vector_score = 0.0;
                candidate.score = scaled;
                candidate
            })
            .collect();

        debug!(
            "Text retrieval for '{}' returned {} candidates",
            request.query,
            candidates.len()
        );
        Ok(candidates)
    }
}
