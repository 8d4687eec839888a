//! # kbsearch Server
//!
//! HTTP boundary for the kbsearch retrieval engine. Exposes
//! `GET /search/{mode}` where `mode` is `vector`, `text`, or `hybrid`,
//! validates the request against the bot's configured algorithm, expands the
//! query into paraphrase variations, runs variant fusion, and answers with a
//! uniform envelope:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Query by hybrid successful",
//!   "data": [ ... ],
//!   "query_variations": [ ... ],
//!   "generated_user_id": "bot-1-k3f9a2"
//! }
//! ```
//!
//! Failures reuse the same envelope with `success: false` and an empty
//! `data`; raw error detail goes to the audit sink only, never to the caller.

mod audit;
mod config;
mod routes;

pub use audit::{AuditConfig, HttpAuditSink, generate_user_id};
pub use config::ServerConfig;
pub use routes::{AppState, router};
