use anyhow::Context;
use kbsearch_doc_store::InMemoryStore;
use kbsearch_embeddings::{EmbeddingClient, EmbeddingConfig};
use kbsearch_query_expansion::{VariationConfig, VariationGenerator};
use kbsearch_retrieval::{FusionEngine, RetrievalConfig};
use kbsearch_server::{AppState, AuditConfig, ServerConfig, router};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let server_config = ServerConfig::from_env();
    let retrieval_config = RetrievalConfig::default();
    retrieval_config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid retrieval configuration")?;

    let embedder = EmbeddingClient::new(EmbeddingConfig {
        endpoint: server_config.embedding_url.clone(),
        api_key: server_config.ai_key.clone(),
        ..Default::default()
    })
    .context("embedding client configuration (set EMBEDDING_AI_URL)")?;

    let expander = VariationGenerator::new(VariationConfig {
        endpoint: server_config.chat_url.clone(),
        api_key: server_config.ai_key.clone(),
        ..Default::default()
    })
    .context("paraphrase provider configuration (set CHAT_AI_URL)")?;

    let state = Arc::new(AppState {
        store: Arc::new(InMemoryStore::new()),
        embedder: Arc::new(embedder),
        expander,
        fusion: FusionEngine::new(retrieval_config.clone()),
        config: retrieval_config,
        audit: AuditConfig {
            logs_endpoint: server_config.logs_url.clone(),
            api_key: server_config.logs_api_key.clone(),
        },
    });

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("binding {}", server_config.bind_addr))?;
    info!("Listening on {}", server_config.bind_addr);

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
