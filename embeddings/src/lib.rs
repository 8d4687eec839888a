//! # kbsearch Embeddings
//!
//! This crate provides query embedding functionality for semantic question
//! search. Embeddings are generated by a remote HTTP provider and L2-normalized
//! before use so that similarity scores are comparable across models.
//!
//! ## Features
//!
//! - HTTP embedding provider client with bearer authentication
//! - Per-request model selection (bots may configure their own model)
//! - L2 normalization with a zero-vector guard
//!
//! ## Example
//!
//! ```no_run
//! use kbsearch_embeddings::{EmbeddingClient, EmbeddingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kbsearch_embeddings::EmbeddingError> {
//!     let client = EmbeddingClient::new(EmbeddingConfig {
//!         endpoint: "https://api.example.com/v1/embeddings".to_string(),
//!         api_key: Some("secret".to_string()),
//!         ..Default::default()
//!     })?;
//!     let embedding = client.embed_query("how do I reset my password", None).await?;
//!     println!("Got {} dimensions", embedding.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod normalize;

pub use client::{EmbeddingClient, EmbeddingConfig};
pub use error::EmbeddingError;
pub use normalize::normalize_vector;

/// Model used when neither the request nor the bot configures one
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embed-base";
