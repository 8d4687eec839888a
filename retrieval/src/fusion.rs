use crate::config::RetrievalConfig;
use crate::rerank::OverlapReranker;
use crate::retriever::{RetrievalRequest, Retriever};
use crate::sink::{EventSink, Severity};
use kbsearch_doc_store::Candidate;
use log::debug;
use serde_json::json;
use std::collections::HashMap;

/// Fusion engine combining the results of multiple query variations.
///
/// Variations are processed strictly left to right: the merge tie-break
/// (an equal score never displaces an earlier entry) and the overlap
/// baseline (variation 0 is the literal user query) both depend on that
/// order, so it is part of the contract rather than an implementation
/// detail.
pub struct FusionEngine {
    config: RetrievalConfig,
    reranker: OverlapReranker,
}

impl FusionEngine {
    /// Create a new fusion engine
    pub fn new(config: RetrievalConfig) -> Self {
        let reranker = OverlapReranker::new(config.clone());
        Self { config, reranker }
    }

    /// Fan the variations out across `retriever`, merge by candidate id,
    /// rerank against the original query, and truncate to the request limit.
    ///
    /// A failing variation is recorded on the sink and skipped; every
    /// variation failing, or nothing surviving the overlap filter, yields an
    /// empty list rather than an error.
    pub async fn fuse(
        &self,
        variations: &[String],
        retriever: &dyn Retriever,
        request: &RetrievalRequest,
        sink: &dyn EventSink,
    ) -> Vec<Candidate> {
        let Some(original_query) = variations.first() else {
            return Vec::new();
        };

        // Insertion-ordered merge set: HashMap for identity lookups, Vec for
        // the deterministic order the stable rerank sort relies on.
        let mut merged: Vec<Candidate> = Vec::new();
        let mut index_by_id: HashMap<String, usize> = HashMap::new();

        for variation in variations {
            let trimmed = variation.trim();
            sink.record(
                "fusion: querying variation",
                json!({ "variation": trimmed }),
                true,
                Severity::Info,
            );

            let results = match retriever.retrieve(&request.with_query(trimmed)).await {
                Ok(results) => results,
                Err(e) => {
                    sink.record(
                        "fusion: variation query failed",
                        json!({ "variation": trimmed, "error": e.to_string() }),
                        true,
                        Severity::Error,
                    );
                    continue;
                }
            };

            for candidate in results {
                match index_by_id.get(&candidate.id) {
                    Some(&idx) => {
                        // Strictly greater replaces; ties keep the earlier
                        // variation's entry.
                        if candidate.score > merged[idx].score {
                            merged[idx] = candidate;
                        }
                    }
                    None => {
                        index_by_id.insert(candidate.id.clone(), merged.len());
                        merged.push(candidate);
                    }
                }
            }
        }

        debug!(
            "Fusion merged {} distinct candidates from {} variations",
            merged.len(),
            variations.len()
        );

        self.reranker.rerank(original_query, merged, request.limit)
    }

    /// Get the configuration of this engine
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, RetrievalError};
    use crate::sink::NoopSink;
    use async_trait::async_trait;
    use kbsearch_doc_store::{DocStoreError, QaDocument};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Retriever double returning canned results per query text
    struct ScriptedRetriever {
        responses: HashMap<String, Result<Vec<Candidate>>>,
    }

    impl ScriptedRetriever {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn on(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
            self.responses.insert(query.to_string(), Ok(candidates));
            self
        }

        fn failing_on(mut self, query: &str) -> Self {
            self.responses.insert(
                query.to_string(),
                Err(RetrievalError::Store(DocStoreError::Backend(
                    "connection refused".to_string(),
                ))),
            );
            self
        }
    }

    #[async_trait]
    impl Retriever for ScriptedRetriever {
        async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>> {
            match self.responses.get(&request.query) {
                Some(Ok(candidates)) => Ok(candidates.clone()),
                Some(Err(_)) => Err(RetrievalError::Store(DocStoreError::Backend(
                    "connection refused".to_string(),
                ))),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Sink double capturing recorded steps in order
    struct CapturingSink {
        steps: Mutex<Vec<(String, Value, Severity)>>,
    }

    impl CapturingSink {
        fn new() -> Self {
            Self {
                steps: Mutex::new(Vec::new()),
            }
        }
    }

    impl EventSink for CapturingSink {
        fn record(&self, label: &str, metadata: Value, _emit: bool, severity: Severity) {
            self.steps
                .lock()
                .unwrap()
                .push((label.to_string(), metadata, severity));
        }
    }

    fn candidate(id: &str, question: &str, answer: &str, score: f32) -> Candidate {
        let mut c = Candidate::from_document(QaDocument::new(id, question, answer, "bot-1"));
        c.score = score;
        c
    }

    fn variations(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn engine() -> FusionEngine {
        FusionEngine::new(RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_end_to_end_variant_fusion() {
        // Original "cat food"; paraphrases add "feline diet" and
        // "kitten nutrition". C has zero overlap and is excluded despite
        // its 0.99 score; A and B order by blended score.
        let retriever = ScriptedRetriever::new()
            .on(
                "cat food",
                vec![candidate("A", "Best cat food", "Top food picks", 0.95)],
            )
            .on(
                "feline diet",
                vec![candidate("B", "Cat diets", "Feeding guide", 0.92)],
            )
            .on(
                "kitten nutrition",
                vec![candidate("C", "Dog kennels", "Outdoor housing", 0.99)],
            );

        let request = RetrievalRequest::new("cat food", "bot-1", 2);
        let results = engine()
            .fuse(
                &variations(&["cat food", "feline diet", "kitten nutrition"]),
                &retriever,
                &request,
                &NoopSink,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "A");
        assert_eq!(results[0].overlap_score, Some(2));
        assert_eq!(results[1].id, "B");
        assert_eq!(results[1].overlap_score, Some(1));
    }

    #[tokio::test]
    async fn test_merge_keeps_strictly_greater_score() {
        let retriever = ScriptedRetriever::new()
            .on("cat food", vec![candidate("A", "cat food", "guide", 0.95)])
            .on("cat chow", vec![candidate("A", "cat food", "guide", 0.80)]);

        let request = RetrievalRequest::new("cat food", "bot-1", 5);
        let results = engine()
            .fuse(
                &variations(&["cat food", "cat chow"]),
                &retriever,
                &request,
                &NoopSink,
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.95);
    }

    #[tokio::test]
    async fn test_merge_tie_keeps_first_seen() {
        let mut early = candidate("A", "cat food", "first answer", 0.9);
        early.vector_score = 0.9;
        let mut late = candidate("A", "cat food", "second answer", 0.9);
        late.text_score = 0.9;

        let retriever = ScriptedRetriever::new()
            .on("cat food", vec![early])
            .on("cat chow", vec![late]);

        let request = RetrievalRequest::new("cat food", "bot-1", 5);
        let results = engine()
            .fuse(
                &variations(&["cat food", "cat chow"]),
                &retriever,
                &request,
                &NoopSink,
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].answer, "first answer");
        assert_eq!(results[0].vector_score, 0.9);
    }

    #[tokio::test]
    async fn test_failed_variation_skipped_not_fatal() {
        let retriever = ScriptedRetriever::new()
            .failing_on("broken")
            .on("cat food", vec![candidate("A", "cat food", "guide", 0.9)]);

        let sink = CapturingSink::new();
        let request = RetrievalRequest::new("cat food", "bot-1", 5);
        let results = engine()
            .fuse(
                &variations(&["cat food", "broken"]),
                &retriever,
                &request,
                &sink,
            )
            .await;

        assert_eq!(results.len(), 1);

        let steps = sink.steps.lock().unwrap();
        assert!(
            steps
                .iter()
                .any(|(label, _, severity)| label == "fusion: variation query failed"
                    && *severity == Severity::Error)
        );
    }

    #[tokio::test]
    async fn test_all_variations_failing_yields_empty_list() {
        let retriever = ScriptedRetriever::new().failing_on("a").failing_on("b");

        let request = RetrievalRequest::new("a", "bot-1", 5);
        let results = engine()
            .fuse(&variations(&["a", "b"]), &retriever, &request, &NoopSink)
            .await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_variation_text_trimmed_before_retrieval() {
        let retriever = ScriptedRetriever::new()
            .on("cat food", vec![candidate("A", "cat food", "guide", 0.9)]);

        let request = RetrievalRequest::new("cat food", "bot-1", 5);
        let results = engine()
            .fuse(
                &variations(&["  cat food  "]),
                &retriever,
                &request,
                &NoopSink,
            )
            .await;

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_output_bounded_by_limit_and_distinct_survivors() {
        let retriever = ScriptedRetriever::new().on(
            "cat",
            vec![
                candidate("A", "cat one", "", 0.9),
                candidate("B", "cat two", "", 0.8),
                candidate("C", "cat three", "", 0.7),
                candidate("D", "dog", "", 0.99),
            ],
        );

        // limit larger than survivors: bounded by distinct overlap > 0
        let request = RetrievalRequest::new("cat", "bot-1", 10);
        let results = engine()
            .fuse(&variations(&["cat"]), &retriever, &request, &NoopSink)
            .await;
        assert_eq!(results.len(), 3);

        // limit smaller: bounded by limit
        let request = RetrievalRequest::new("cat", "bot-1", 2);
        let results = engine()
            .fuse(&variations(&["cat"]), &retriever, &request, &NoopSink)
            .await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_variation_list_yields_empty_list() {
        let retriever = ScriptedRetriever::new();
        let request = RetrievalRequest::new("q", "bot-1", 5);
        let results = engine()
            .fuse(&[], &retriever, &request, &NoopSink)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_overlap_measured_against_original_not_paraphrase() {
        // Candidate matches the paraphrase wording only; the original query
        // shares no token, so it is excluded.
        let retriever = ScriptedRetriever::new().on(
            "feline diet",
            vec![candidate("A", "feline diet basics", "about felines", 0.9)],
        );

        let request = RetrievalRequest::new("cat food", "bot-1", 5);
        let results = engine()
            .fuse(
                &variations(&["cat food", "feline diet"]),
                &retriever,
                &request,
                &NoopSink,
            )
            .await;

        assert!(results.is_empty());
    }
}
