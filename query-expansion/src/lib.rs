//! # kbsearch Query Expansion
//!
//! Paraphrase supply for multi-variant retrieval. Given a user query, this
//! crate asks a chat-completions provider for a handful of rewordings and
//! returns them as an ordered variation list whose element 0 is always the
//! original, unmodified query.
//!
//! Expansion is strictly best-effort: a provider fault, an empty body, or an
//! unparseable answer degrades to `[original]` — the caller's search always
//! proceeds.
//!
//! ## Example
//!
//! ```no_run
//! use kbsearch_query_expansion::{VariationConfig, VariationGenerator};
//! use kbsearch_retrieval::NoopSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kbsearch_query_expansion::ExpansionError> {
//!     let generator = VariationGenerator::new(VariationConfig {
//!         endpoint: "https://api.example.com/v1/chat/completions".to_string(),
//!         api_key: Some("secret".to_string()),
//!         ..Default::default()
//!     })?;
//!     let variations = generator.expand("how do I reset my password", None, &NoopSink).await;
//!     assert_eq!(variations[0], "how do I reset my password");
//!     Ok(())
//! }
//! ```

mod error;
mod generator;

pub use error::ExpansionError;
pub use generator::{VariationConfig, VariationGenerator};
