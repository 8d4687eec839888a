use crate::DEFAULT_EMBEDDING_MODEL;
use crate::error::{EmbeddingError, Result};
use crate::normalize::normalize_vector;
use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration for the embedding provider client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider endpoint, e.g. `https://api.example.com/v1/embeddings`
    pub endpoint: String,

    /// Bearer token sent with every request, if the provider requires one
    pub api_key: Option<String>,

    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            default_model: default_model(),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for a remote embedding provider
pub struct EmbeddingClient {
    http: reqwest::Client,
    config: EmbeddingConfig,
}

impl EmbeddingClient {
    /// Create a new client for the configured provider
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(EmbeddingError::Configuration(
                "embedding endpoint must not be empty".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Generate a normalized embedding for a query string.
    ///
    /// `model` overrides the configured default, letting a bot select its own
    /// embedding model per request. The returned vector is L2-normalized; a
    /// provider fault or a 2xx body without an embedding is an error.
    pub async fn embed_query(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        let model = model.unwrap_or(&self.config.default_model);
        debug!("Embedding query with model {model}");

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .json(&EmbeddingRequest { model, input: text });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or(EmbeddingError::MissingEmbedding)?;

        debug!("Received embedding with {} dimensions", embedding.len());
        Ok(normalize_vector(embedding))
    }

    /// Get the configuration of this client
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint: format!("{}/v1/embeddings", server.uri()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let result = EmbeddingClient::new(EmbeddingConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_embed_query_normalizes_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [3.0, 4.0]}]
            })))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(test_config(&server)).unwrap();
        let embedding = client.embed_query("reset password", None).await.unwrap();

        assert_eq!(embedding, vec![0.6, 0.8]);
    }

    #[tokio::test]
    async fn test_model_override_sent_to_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(json!({"model": "bot-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [1.0, 0.0]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(test_config(&server)).unwrap();
        client
            .embed_query("query", Some("bot-model"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_embedding_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(test_config(&server)).unwrap();
        let result = client.embed_query("query", None).await;

        assert!(matches!(result, Err(EmbeddingError::MissingEmbedding)));
    }

    #[tokio::test]
    async fn test_provider_error_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(test_config(&server)).unwrap();
        let result = client.embed_query("query", None).await;

        match result {
            Err(EmbeddingError::Provider { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
