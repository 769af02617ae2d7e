// src/messages/types.rs

use serde::Serialize;

/// Caller-visible message record. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub content: String,
    /// ISO-8601 UTC; the store's local timestamp passes through verbatim when
    /// it cannot be parsed.
    pub date: String,
    pub sender: String,
    pub is_from_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
