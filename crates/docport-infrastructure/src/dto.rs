//! Wire formats of the portal API.
//!
//! Only request/response envelopes live here; `Document` and `HistoryEntry`
//! deserialize straight into the domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `/token` and `/register` responses.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Body of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookResponse {
    pub webhook_url: String,
}

/// Error envelope: `{"detail": ...}`.
///
/// `detail` is usually a string but validation failures send a list of
/// objects, so it is kept as raw JSON.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Parses an error body, tolerating anything that is not JSON.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// The detail as display text: strings verbatim, other JSON compacted.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}
