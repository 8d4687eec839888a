use crate::audit::{AuditConfig, HttpAuditSink, generate_user_id};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use kbsearch_doc_store::{BotAlgorithm, Candidate, DocStore, translate_operators};
use kbsearch_query_expansion::VariationGenerator;
use kbsearch_retrieval::{
    EventSink, FusionEngine, HybridRetriever, QueryEmbedder, RetrievalConfig, RetrievalRequest,
    Retriever, Severity, TextRetriever, VectorRetriever,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared handler dependencies
pub struct AppState {
    pub store: Arc<dyn DocStore>,
    pub embedder: Arc<dyn QueryEmbedder>,
    pub expander: VariationGenerator,
    pub fusion: FusionEngine,
    pub config: RetrievalConfig,
    pub audit: AuditConfig,
}

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search/{mode}", get(search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query_text: Option<String>,
    pub bot_id: Option<String>,
    pub limit: Option<usize>,
    pub number_of_queries: Option<usize>,
    pub user_id: Option<String>,
    /// JSON-encoded filter predicate
    pub filters: Option<String>,
}

/// Uniform response envelope, identical shape for success and failure
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Candidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_variations: Vec<String>,
    pub generated_user_id: String,
}

impl SearchResponse {
    fn failure(message: impl Into<String>, user_id: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Vec::new(),
            query_variations: Vec::new(),
            generated_user_id: user_id.to_string(),
        }
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<SearchResponse>) {
    let bot_id = params.bot_id.clone().unwrap_or_default();
    let query_text = params.query_text.clone().unwrap_or_default();
    let user_id = params
        .user_id
        .clone()
        .unwrap_or_else(|| generate_user_id(&bot_id));

    let sink = HttpAuditSink::new(state.audit.clone(), &user_id, &bot_id, &query_text);
    sink.record(
        &format!("search: {mode} query request received"),
        json!({}),
        true,
        Severity::Info,
    );

    let (Some(_), Some(_), Some(limit)) = (&params.query_text, &params.bot_id, params.limit)
    else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Missing required parameters",
            &user_id,
            &sink,
        );
    };

    let definition = match state.store.bot_definition(&bot_id).await {
        Ok(Some(definition)) => definition,
        Ok(None) => {
            return fail(
                StatusCode::NOT_FOUND,
                "Bot definition not found",
                &user_id,
                &sink,
            );
        }
        Err(e) => {
            sink.record(
                "search: bot definition lookup failed",
                json!({ "error": e.to_string() }),
                true,
                Severity::Error,
            );
            return fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error, check logs",
                &user_id,
                &sink,
            );
        }
    };

    let Some(requested) = BotAlgorithm::parse(&mode) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Invalid query type",
            &user_id,
            &sink,
        );
    };
    if requested != definition.algorithm {
        let message = format!(
            "This bot is configured for '{}' search only.",
            definition.algorithm.as_str()
        );
        return fail(StatusCode::FORBIDDEN, message, &user_id, &sink);
    }

    let filter = parse_filters(params.filters.as_deref(), &sink);
    let mut request = RetrievalRequest::new(&query_text, &bot_id, limit);
    request.filter = filter;
    request.embedding_model = definition.embedding_model.clone();

    let retriever: Box<dyn Retriever> = match definition.algorithm {
        BotAlgorithm::Vector => Box::new(VectorRetriever::new(
            state.store.clone(),
            state.embedder.clone(),
            state.config.clone(),
        )),
        BotAlgorithm::Text => Box::new(TextRetriever::new(
            state.store.clone(),
            state.config.clone(),
        )),
        BotAlgorithm::Hybrid => Box::new(HybridRetriever::new(
            state.store.clone(),
            state.embedder.clone(),
            state.config.clone(),
        )),
    };

    let variations = state
        .expander
        .expand(&query_text, params.number_of_queries, &sink)
        .await;
    let results = state
        .fusion
        .fuse(&variations, retriever.as_ref(), &request, &sink)
        .await;

    // Timestamps add noise to the audit trail
    let logged: Vec<Candidate> = results.iter().map(Candidate::without_timestamps).collect();
    sink.record(
        "search: merged query results",
        json!({ "merged_results": logged }),
        true,
        Severity::Info,
    );

    let message = format!("Query by {} successful", definition.algorithm.as_str());
    sink.finish(true, &message);
    (
        StatusCode::OK,
        Json(SearchResponse {
            success: true,
            message,
            data: results,
            query_variations: variations,
            generated_user_id: user_id,
        }),
    )
}

fn fail(
    status: StatusCode,
    message: impl Into<String>,
    user_id: &str,
    sink: &HttpAuditSink,
) -> (StatusCode, Json<SearchResponse>) {
    let response = SearchResponse::failure(message, user_id);
    sink.finish(false, &response.message);
    (status, Json(response))
}

/// Decode the `filters` query parameter and translate its bare operator
/// names into the store's native dialect. Malformed JSON is recorded and
/// treated as "no filter" rather than rejecting the request.
fn parse_filters(raw: Option<&str>, sink: &dyn EventSink) -> Value {
    let Some(raw) = raw else {
        return Value::Object(serde_json::Map::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => {
            let translated = translate_operators(&parsed);
            sink.record(
                "search: translated filters",
                json!({ "filters": translated }),
                true,
                Severity::Info,
            );
            translated
        }
        Err(e) => {
            sink.record(
                "search: invalid filters JSON, proceeding unfiltered",
                json!({ "filters": raw, "error": e.to_string() }),
                true,
                Severity::Warning,
            );
            Value::Object(serde_json::Map::new())
        }
    }
}
