use crate::document::{BotDefinition, QaDocument};
use crate::error::Result;
use crate::store::{DocStore, TextHit, VectorHit};
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredDocument {
    document: QaDocument,
    embedding: Vec<f32>,
}

/// In-memory reference store.
///
/// Backs tests and dev runs with the same interface a production document
/// store exposes: cosine similarity over stored embeddings, a token-match
/// lexical metric over the question text, and structural evaluation of
/// translated (`$`-prefixed) filter predicates.
#[derive(Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<Vec<StoredDocument>>>,
    bots: Arc<RwLock<HashMap<String, BotDefinition>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with its precomputed embedding
    pub async fn add_document(&self, document: QaDocument, embedding: Vec<f32>) {
        let mut documents = self.documents.write().await;
        documents.push(StoredDocument {
            document,
            embedding,
        });
    }

    /// Register or replace a bot definition
    pub async fn upsert_bot(&self, definition: BotDefinition) {
        let mut bots = self.bots.write().await;
        bots.insert(definition.bot_id.clone(), definition);
    }

    /// Number of stored documents
    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DocStore for InMemoryStore {
    async fn vector_search(
        &self,
        query_vector: &[f32],
        bot_id: &str,
        limit: usize,
        filter: &Value,
    ) -> Result<Vec<VectorHit>> {
        debug!("Vector search for bot {bot_id} (limit: {limit})");

        let documents = self.documents.read().await;
        let mut hits: Vec<VectorHit> = documents
            .iter()
            .filter(|stored| stored.document.bot_id == bot_id)
            .filter(|stored| matches_filter(&stored.document, filter))
            .map(|stored| VectorHit {
                document: stored.document.clone(),
                similarity: cosine_similarity(query_vector, &stored.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        debug!("Vector search found {} hits", hits.len());
        Ok(hits)
    }

    async fn text_search(
        &self,
        query: &str,
        bot_id: &str,
        limit: usize,
        filter: &Value,
    ) -> Result<Vec<TextHit>> {
        debug!("Text search for bot {bot_id} (limit: {limit})");

        let documents = self.documents.read().await;
        let mut hits: Vec<TextHit> = documents
            .iter()
            .filter(|stored| stored.document.bot_id == bot_id)
            .filter(|stored| matches_filter(&stored.document, filter))
            .filter_map(|stored| {
                let relevance = lexical_relevance(query, &stored.document.question);
                (relevance > 0.0).then(|| TextHit {
                    document: stored.document.clone(),
                    relevance,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        debug!("Text search found {} hits", hits.len());
        Ok(hits)
    }

    async fn bot_definition(&self, bot_id: &str) -> Result<Option<BotDefinition>> {
        let bots = self.bots.read().await;
        Ok(bots.get(bot_id).cloned())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

/// Native lexical metric of the reference store: the number of distinct
/// query tokens present among the question's tokens.
fn lexical_relevance(query: &str, question: &str) -> f32 {
    let question_tokens: Vec<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut seen = std::collections::HashSet::new();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| seen.insert(token.to_string()))
        .filter(|token| question_tokens.iter().any(|q| q == token))
        .count() as f32
}

/// Evaluate a translated filter predicate against a document.
///
/// Each top-level key names a field; its condition is either a map of `$`
/// operators or a bare value compared for equality.
fn matches_filter(document: &QaDocument, filter: &Value) -> bool {
    let Value::Object(conditions) = filter else {
        return true;
    };
    if conditions.is_empty() {
        return true;
    }

    let Ok(doc_json) = serde_json::to_value(document) else {
        return false;
    };

    conditions
        .iter()
        .all(|(field, condition)| field_matches(doc_json.get(field), condition))
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Object(ops) if ops.keys().all(|k| k.starts_with('$')) && !ops.is_empty() => ops
            .iter()
            .all(|(op, operand)| apply_operator(actual, op, operand)),
        bare => actual == Some(bare),
    }
}

fn apply_operator(actual: Option<&Value>, op: &str, operand: &Value) -> bool {
    match op {
        "$eq" => actual == Some(operand),
        "$ne" => actual != Some(operand),
        "$in" => operand
            .as_array()
            .is_some_and(|items| actual.is_some_and(|a| items.contains(a))),
        "$nin" => operand
            .as_array()
            .is_some_and(|items| !actual.is_some_and(|a| items.contains(a))),
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let (Some(a), Some(b)) = (actual.and_then(Value::as_f64), operand.as_f64()) else {
                return false;
            };
            match op {
                "$gt" => a > b,
                "$gte" => a >= b,
                "$lt" => a < b,
                _ => a <= b,
            }
        }
        _ => false,
    }
}
