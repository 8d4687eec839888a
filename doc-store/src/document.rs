use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A question/answer document as stored, before any scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaDocument {
    /// Opaque identifier, unique and stable within one bot's corpus
    pub id: String,

    /// The canonical question text
    pub question: String,

    /// The answer text
    pub answer: String,

    /// Owning bot (tenant)
    pub bot_id: String,

    /// When the document was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the document was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Custom fields, addressable by filter predicates
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl QaDocument {
    /// Create a new document
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        bot_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
            bot_id: bot_id.into(),
            created_at: None,
            updated_at: None,
            custom: HashMap::new(),
        }
    }

    /// Attach a custom field usable in filter predicates
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// A document plus its per-request relevance scores.
///
/// One retrieval call populates exactly one modality; `score` always carries
/// that modality's primary ranking value. `overlap_score` is attached only by
/// the fusion engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Document identity, the merge key across query variations
    pub id: String,

    /// Question text
    pub question: String,

    /// Answer text
    pub answer: String,

    /// Owning bot
    pub bot_id: String,

    /// Vector-similarity contribution (0 when absent)
    #[serde(default)]
    pub vector_score: f32,

    /// Lexical-relevance contribution (0 when absent)
    #[serde(default)]
    pub text_score: f32,

    /// Primary ranking value for the retrieval call that produced this
    #[serde(default)]
    pub score: f32,

    /// Count of distinct original-query tokens found in question + answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_score: Option<u32>,

    /// Informational timestamps, stripped before logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Build a candidate from a stored document with all scores zeroed
    pub fn from_document(document: QaDocument) -> Self {
        Self {
            id: document.id,
            question: document.question,
            answer: document.answer,
            bot_id: document.bot_id,
            vector_score: 0.0,
            text_score: 0.0,
            score: 0.0,
            overlap_score: None,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }

    /// Copy with timestamps removed, for event-sink payloads
    pub fn without_timestamps(&self) -> Self {
        Self {
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

/// Retrieval mode a bot is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotAlgorithm {
    Vector,
    Text,
    Hybrid,
}

impl BotAlgorithm {
    /// Parse a case-insensitive mode name as it appears in request paths
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "vector" => Some(Self::Vector),
            "text" => Some(Self::Text),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Lowercase name, matching the request-path spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Text => "text",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Per-bot search configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotDefinition {
    /// Bot (tenant) identifier
    pub bot_id: String,

    /// The one retrieval mode this bot accepts
    pub algorithm: BotAlgorithm,

    /// Embedding model for vector-dependent modes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}
