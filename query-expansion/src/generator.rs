use crate::error::ExpansionError;
use kbsearch_retrieval::{EventSink, Severity};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Configuration for the paraphrase provider client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationConfig {
    /// Chat-completions endpoint of the language provider
    pub endpoint: String,

    /// Bearer token sent with every request, if the provider requires one
    pub api_key: Option<String>,

    /// Model asked to produce the paraphrases
    #[serde(default = "default_model")]
    pub model: String,

    /// Paraphrase count used when the caller supplies none (or an invalid one)
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// Upper bound on caller-requested paraphrase counts
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

fn default_model() -> String {
    "llama-3.3-70b-instruct".to_string()
}

fn default_count() -> usize {
    3
}

fn default_max_count() -> usize {
    8
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            model: default_model(),
            default_count: default_count(),
            max_count: default_max_count(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client generating query paraphrases through a chat-completions provider
pub struct VariationGenerator {
    http: reqwest::Client,
    config: VariationConfig,
}

impl VariationGenerator {
    /// Create a new generator for the configured provider
    pub fn new(config: VariationConfig) -> Result<Self, ExpansionError> {
        if config.endpoint.is_empty() {
            return Err(ExpansionError::Configuration(
                "paraphrase endpoint must not be empty".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Produce the ordered variation list for a query.
    ///
    /// Element 0 is always the original, unmodified query. `requested` counts
    /// outside `1..=max_count` fall back to the default. Any provider fault
    /// degrades to `[original]`; the caller never sees an error.
    pub async fn expand(
        &self,
        query: &str,
        requested: Option<usize>,
        sink: &dyn EventSink,
    ) -> Vec<String> {
        let count = self.clamp_count(requested);

        match self.fetch_paraphrases(query, count).await {
            Ok(generated) => {
                let mut variations = vec![query.to_string()];
                if count == 1 {
                    // Only take the first paraphrase
                    if let Some(first) = generated.into_iter().next() {
                        variations.push(first);
                    }
                } else {
                    variations.extend(generated);
                }
                sink.record(
                    "expansion: generated query variations",
                    json!({ "query_variations": variations }),
                    true,
                    Severity::Info,
                );
                variations
            }
            Err(ExpansionError::EmptyResponse) => {
                sink.record(
                    "expansion: provider returned no data, proceeding with the original query",
                    json!({}),
                    true,
                    Severity::Warning,
                );
                vec![query.to_string()]
            }
            Err(e) => {
                sink.record(
                    "expansion: provider error, using original query",
                    json!({ "error": e.to_string() }),
                    true,
                    Severity::Error,
                );
                vec![query.to_string()]
            }
        }
    }

    fn clamp_count(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n >= 1 && n <= self.config.max_count => n,
            _ => self.config.default_count,
        }
    }

    async fn fetch_paraphrases(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<String>, ExpansionError> {
        let prompt = format!(
            "Can you generate this query in {count} ways as a comma-separated list only? \
             Your response must not contain anything else other than the comma separated \
             queries. Query:{query}"
        );

        let mut request = self.http.post(&self.config.endpoint).json(&json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExpansionError::Provider(status.as_u16()));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExpansionError::EmptyResponse)?;

        let generated: Vec<String> = content
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Provider produced {} paraphrases", generated.len());
        Ok(generated)
    }

    /// Get the configuration of this generator
    pub fn config(&self) -> &VariationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbsearch_retrieval::NoopSink;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator_for(server: &MockServer) -> VariationGenerator {
        VariationGenerator::new(VariationConfig {
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "content": content } }] })
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(VariationGenerator::new(VariationConfig::default()).is_err());
    }

    #[test]
    fn test_clamp_count() {
        let config = VariationConfig {
            endpoint: "http://localhost".to_string(),
            ..Default::default()
        };
        let generator = VariationGenerator::new(config).unwrap();

        assert_eq!(generator.clamp_count(None), 3);
        assert_eq!(generator.clamp_count(Some(0)), 3);
        assert_eq!(generator.clamp_count(Some(9)), 3);
        assert_eq!(generator.clamp_count(Some(1)), 1);
        assert_eq!(generator.clamp_count(Some(8)), 8);
    }

    #[tokio::test]
    async fn test_expand_prepends_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("feline diet, kitten nutrition, cat meals")),
            )
            .mount(&server)
            .await;

        let variations = generator_for(&server)
            .expand("cat food", Some(3), &NoopSink)
            .await;

        assert_eq!(
            variations,
            vec!["cat food", "feline diet", "kitten nutrition", "cat meals"]
        );
    }

    #[tokio::test]
    async fn test_single_count_takes_first_paraphrase_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_body("feline diet, extra answer")),
            )
            .mount(&server)
            .await;

        let variations = generator_for(&server)
            .expand("cat food", Some(1), &NoopSink)
            .await;

        assert_eq!(variations, vec!["cat food", "feline diet"]);
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let variations = generator_for(&server)
            .expand("cat food", Some(3), &NoopSink)
            .await;

        assert_eq!(variations, vec!["cat food"]);
    }

    #[tokio::test]
    async fn test_empty_content_degrades_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("  ")))
            .mount(&server)
            .await;

        let variations = generator_for(&server)
            .expand("cat food", Some(3), &NoopSink)
            .await;

        assert_eq!(variations, vec!["cat food"]);
    }

    #[tokio::test]
    async fn test_missing_choices_degrades_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let variations = generator_for(&server)
            .expand("cat food", None, &NoopSink)
            .await;

        assert_eq!(variations, vec!["cat food"]);
    }

    #[tokio::test]
    async fn test_unreachable_provider_degrades_to_original() {
        let generator = VariationGenerator::new(VariationConfig {
            endpoint: "http://127.0.0.1:9/unreachable".to_string(),
            ..Default::default()
        })
        .unwrap();

        let variations = generator.expand("cat food", None, &NoopSink).await;
        assert_eq!(variations, vec!["cat food"]);
    }

    #[tokio::test]
    async fn test_requested_count_reaches_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"model": "llama-3.3-70b-instruct"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("one, two")))
            .expect(1)
            .mount(&server)
            .await;

        generator_for(&server)
            .expand("cat food", Some(2), &NoopSink)
            .await;
    }
}
