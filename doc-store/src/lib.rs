//! # kbsearch Document Store
//!
//! This crate defines the question/answer document model and the storage
//! interface the retrieval engine runs against. The store itself is an
//! external collaborator; callers talk to it through the [`DocStore`] trait,
//! which exposes raw vector-similarity and lexical-relevance lookups plus
//! per-bot configuration. Modality-specific scaling and quality floors belong
//! to the retrievers, not the store.
//!
//! Also included:
//!
//! - Translation of caller-facing filter predicates (`gt`, `gte`, `lt`, `lte`,
//!   `ne`, `eq`, `in`, `nin`) into the store's native `$`-prefixed operators
//! - [`InMemoryStore`], a reference backend used by tests and dev runs

mod document;
mod error;
mod filter;
mod memory;
mod store;

pub use document::{BotAlgorithm, BotDefinition, Candidate, QaDocument};
pub use error::DocStoreError;
pub use filter::translate_operators;
pub use memory::InMemoryStore;
pub use store::{DocStore, TextHit, VectorHit};
