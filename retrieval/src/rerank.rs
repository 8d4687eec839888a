use crate::config::RetrievalConfig;
use kbsearch_doc_store::Candidate;
use log::debug;
use std::collections::HashSet;

/// Reranker scoring merged candidates by lexical overlap with the original
/// query, then ordering by a weighted blend of retrieval score and overlap.
pub struct OverlapReranker {
    config: RetrievalConfig,
}

impl OverlapReranker {
    /// Create a new overlap reranker
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Attach overlap scores, drop zero-overlap candidates, order by the
    /// blended score, and truncate to `limit`.
    ///
    /// A candidate sharing no token with the original query is discarded
    /// regardless of its retrieval score. The input order is preserved for
    /// blended-score ties (the sort is stable).
    pub fn rerank(
        &self,
        original_query: &str,
        candidates: Vec<Candidate>,
        limit: usize,
    ) -> Vec<Candidate> {
        let mut scored: Vec<Candidate> = candidates
            .into_iter()
            .map(|mut candidate| {
                candidate.overlap_score = Some(count_query_overlap(original_query, &candidate));
                candidate
            })
            .filter(|candidate| candidate.overlap_score.unwrap_or(0) > 0)
            .collect();

        scored.sort_by(|a, b| {
            self.blended(b)
                .partial_cmp(&self.blended(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        debug!("Overlap rerank kept {} candidates", scored.len());
        scored
    }

    fn blended(&self, candidate: &Candidate) -> f32 {
        candidate.score * self.config.retrieval_weight
            + candidate.overlap_score.unwrap_or(0) as f32 * self.config.overlap_weight
    }
}

/// Count distinct whitespace-separated query tokens occurring as a substring
/// anywhere in the candidate's lowercased question + answer text.
fn count_query_overlap(query: &str, candidate: &Candidate) -> u32 {
    let combined = format!("{} {}", candidate.question, candidate.answer).to_lowercase();
    let words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    words
        .iter()
        .filter(|word| combined.contains(word.as_str()))
        .count() as u32
}
