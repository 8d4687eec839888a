use std::env;

/// Server settings sourced from the environment (`.env` supported)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Embedding provider endpoint
    pub embedding_url: String,

    /// Chat-completions endpoint used for paraphrase generation
    pub chat_url: String,

    /// Bearer token shared by both AI providers
    pub ai_key: Option<String>,

    /// Audit-log collection endpoint; logging is disabled when unset
    pub logs_url: Option<String>,

    /// API key for the audit-log endpoint
    pub logs_api_key: Option<String>,
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            embedding_url: env::var("EMBEDDING_AI_URL").unwrap_or_default(),
            chat_url: env::var("CHAT_AI_URL").unwrap_or_default(),
            ai_key: env::var("AI_KEY").ok(),
            logs_url: env::var("LOGS_API_URL").ok(),
            logs_api_key: env::var("LOGS_API_KEY").ok(),
        }
    }
}
