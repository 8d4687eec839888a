use chrono::Utc;
use kbsearch_retrieval::{EventSink, Severity};
use log::{error, info, warn};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::{Value, json};
use std::sync::Mutex;

/// Audit-log collection settings; collection is disabled when no endpoint
/// is configured.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    pub logs_endpoint: Option<String>,
    pub api_key: Option<String>,
}

/// Anonymous per-request identifier: the bot id plus six random lowercase
/// alphanumerics, e.g. `bot-1-k3f9a2`.
pub fn generate_user_id(bot_id: &str) -> String {
    let prefix = if bot_id.is_empty() { "bot" } else { bot_id };
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{prefix}-{}", suffix.to_lowercase())
}

/// Request-scoped sink accumulating numbered steps and shipping them to the
/// audit-log endpoint when the request finishes.
///
/// Emitted steps additionally land in the process log as they happen. The
/// final POST is fire-and-forget: audit delivery must never delay or fail a
/// search response.
pub struct HttpAuditSink {
    http: reqwest::Client,
    config: AuditConfig,
    user_id: String,
    bot_id: String,
    query: String,
    steps: Mutex<Vec<Value>>,
}

impl HttpAuditSink {
    /// Open an audit trail for one request
    pub fn new(config: AuditConfig, user_id: &str, bot_id: &str, query: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            user_id: user_id.to_string(),
            bot_id: bot_id.to_string(),
            query: query.to_string(),
            steps: Mutex::new(Vec::new()),
        }
    }

    /// Close the trail and ship it, if an endpoint is configured
    pub fn finish(&self, success: bool, message: &str) {
        let Some(endpoint) = self.config.logs_endpoint.clone() else {
            return;
        };

        let document = self.document(success, message);
        let http = self.http.clone();
        let api_key = self.config.api_key.clone();
        tokio::spawn(async move {
            let mut request = http.post(&endpoint).json(&document);
            if let Some(key) = &api_key {
                request = request.bearer_auth(key);
            }
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!("Audit log endpoint answered {}", response.status());
                }
                Ok(_) => {}
                Err(e) => warn!("Audit log delivery failed: {e}"),
            }
        });
    }

    fn document(&self, success: bool, message: &str) -> Value {
        let steps = self
            .steps
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        json!({
            "user_id": self.user_id,
            "bot_id": self.bot_id,
            "query": self.query,
            "success": success,
            "message": message,
            "steps": steps,
            "finished_at": Utc::now().to_rfc3339(),
        })
    }
}

impl EventSink for HttpAuditSink {
    fn record(&self, label: &str, metadata: Value, emit: bool, severity: Severity) {
        if emit {
            match severity {
                Severity::Info => info!("{label} {metadata}"),
                Severity::Warning => warn!("{label} {metadata}"),
                Severity::Error => error!("{label} {metadata}"),
            }
        }

        if let Ok(mut steps) = self.steps.lock() {
            let step = json!({
                "step": steps.len() + 1,
                "label": label,
                "metadata": metadata,
                "severity": severity_label(severity),
                "at": Utc::now().to_rfc3339(),
            });
            steps.push(step);
        }
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}
