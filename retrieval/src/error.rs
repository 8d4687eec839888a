use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Document store error: {0}")]
    Store(#[from] kbsearch_doc_store::DocStoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] kbsearch_embeddings::EmbeddingError),

    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
