use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::retriever::{QueryEmbedder, RetrievalRequest, Retriever};
use async_trait::async_trait;
use kbsearch_doc_store::{Candidate, DocStore};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Hybrid retriever blending vector similarity and lexical relevance.
///
/// Two stages per query:
///
/// 1. *Blend + floor.* Both raw components run independently and are
///    outer-unioned by document id (a side that missed a document
///    contributes 0). `combined = vector_raw * 0.1 + text_raw * 0.9`;
///    candidates with `combined` below the absolute floor (0.70) are dropped
///    outright, then the batch is sorted and truncated.
/// 2. *Batch renormalization.* The surviving batch is rescaled per modality
///    by its own maximum (floored at 1.0 so an all-zero modality cannot
///    divide by zero), and `final = normalized_vector + normalized_text`.
///
/// Stage 2 is batch-relative by design: the same raw scores can produce
/// different final scores depending on what else survived the floor. The
/// weighting encodes that lexical match is the dominant reliable signal;
/// vector similarity contributes a smaller boost.
pub struct HybridRetriever {
    store: Arc<dyn DocStore>,
    embedder: Arc<dyn QueryEmbedder>,
    config: RetrievalConfig,
}

struct BlendedCandidate {
    candidate: Candidate,
    weighted_vector: f32,
    weighted_text: f32,
}

impl HybridRetriever {
    /// Create a new hybrid retriever
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

    /// Stage 1: weighted blend, absolute floor, sort, truncate
    async fn blend(&self, request: &RetrievalRequest) -> Result<Vec<BlendedCandidate>> {
        let query_vector = self
            .embedder
            .embed_query(&request.query, request.embedding_model.as_deref())
            .await?;

        let (vector_hits, text_hits) = tokio::join!(
            self.store.vector_search(
                &query_vector,
                &request.bot_id,
                request.limit,
                &request.filter,
            ),
            self.store.text_search(
                &request.query,
                &request.bot_id,
                request.limit,
                &request.filter,
            ),
        );
        let (vector_hits, text_hits) = (vector_hits?, text_hits?);

        debug!(
            "Hybrid blend: {} vector + {} text hits",
            vector_hits.len(),
            text_hits.len()
        );

        // Outer union keyed by document id; insertion order kept for
        // deterministic tie handling in the stable sorts below.
        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, BlendedCandidate> = HashMap::new();

        for hit in vector_hits {
            let id = hit.document.id.clone();
            order.push(id.clone());
            merged.insert(
                id,
                BlendedCandidate {
                    candidate: Candidate::from_document(hit.document),
                    weighted_vector: hit.similarity * self.config.vector_weight,
                    weighted_text: 0.0,
                },
            );
        }

        for hit in text_hits {
            let weighted = hit.relevance * self.config.text_weight;
            match merged.get_mut(&hit.document.id) {
                Some(entry) => entry.weighted_text = weighted,
                None => {
                    let id = hit.document.id.clone();
                    order.push(id.clone());
                    merged.insert(
                        id,
                        BlendedCandidate {
                            candidate: Candidate::from_document(hit.document),
                            weighted_vector: 0.0,
                            weighted_text: weighted,
                        },
                    );
                }
            }
        }

        let floor = self.config.hybrid_floor;
        let mut batch: Vec<BlendedCandidate> = order
            .into_iter()
            .filter_map(|id| merged.remove(&id))
            .filter(|entry| entry.weighted_vector + entry.weighted_text >= floor)
            .collect();

        batch.sort_by(|a, b| {
            let combined_a = a.weighted_vector + a.weighted_text;
            let combined_b = b.weighted_vector + b.weighted_text;
            combined_b
                .partial_cmp(&combined_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        batch.truncate(request.limit);

        debug!("Hybrid blend kept {} candidates above floor {floor}", batch.len());
        Ok(batch)
    }

    /// Stage 2: batch-relative renormalization over the surviving candidates
    fn renormalize(batch: Vec<BlendedCandidate>, limit: usize) -> Vec<Candidate> {
        let max_vector = batch
            .iter()
            .map(|e| e.weighted_vector)
            .fold(1.0_f32, f32::max);
        let max_text = batch
            .iter()
            .map(|e| e.weighted_text)
            .fold(1.0_f32, f32::max);

        let mut candidates: Vec<Candidate> = batch
            .into_iter()
            .map(|entry| {
                let mut candidate = entry.candidate;
                candidate.vector_score = entry.weighted_vector / max_vector;
                candidate.text_score = entry.weighted_text / max_text;
                candidate.score = candidate.vector_score + candidate.text_score;
                candidate
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);
        candidates
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>> {
        let batch = self.blend(request).await?;
        Ok(Self::renormalize(batch, request.limit))
    }
}
