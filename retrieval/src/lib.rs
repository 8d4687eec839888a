/*!
# kbsearch Retrieval

Multi-variant retrieval with hybrid score normalization for per-bot
question/answer search:

- **Modality retrievers** for vector similarity and lexical text search,
  each honoring its own quality rules
- **Hybrid scoring** blending both signals with fixed weights, an absolute
  quality floor, then batch-relative renormalization
- **Variant fusion** fanning a query and its paraphrases across a retriever,
  merging by document identity and reranking by lexical overlap with the
  original query

## Architecture

```text
Variations [original, p1, ..]
  └─> Fusion Engine ── per variation ──> Retriever (Vector | Text | Hybrid)
        └─> merge by id (strictly greater score wins)
              └─> overlap rerank vs. original query
                    └─> blend 0.7/0.3, sort, truncate
```

## Example

```rust,no_run
use std::sync::Arc;
use kbsearch_doc_store::InMemoryStore;
use kbsearch_retrieval::{
    FusionEngine, NoopSink, RetrievalConfig, RetrievalRequest, TextRetriever,
};

#[tokio::main]
async fn main() {
    let config = RetrievalConfig::default();
    let store = Arc::new(InMemoryStore::new());
    let retriever = TextRetriever::new(store, config.clone());

    let request = RetrievalRequest::new("how do I reset my password", "bot-1", 5);
    let variations = vec![request.query.clone()];

    let engine = FusionEngine::new(config);
    let results = engine
        .fuse(&variations, &retriever, &request, &NoopSink)
        .await;
    println!("{} results", results.len());
}
```

## Failure model

A failing variation is logged to the event sink and skipped; a failing
paraphrase or embedding call only affects the one retrieval that needed it.
"All variations failed" and "nothing survived the overlap filter" both yield
an empty list, never an error.
*/

mod config;
mod error;
mod fusion;
mod hybrid;
mod rerank;
mod retriever;
mod sink;

pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use fusion::FusionEngine;
pub use hybrid::HybridRetriever;
pub use rerank::OverlapReranker;
pub use retriever::{QueryEmbedder, RetrievalRequest, Retriever, TextRetriever, VectorRetriever};
pub use sink::{EventSink, LogSink, NoopSink, Severity};
