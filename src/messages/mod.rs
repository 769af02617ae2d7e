// src/messages/mod.rs
//! The read pipeline: gate check, query, strict row parse, content recovery,
//! attachment fan-out, final assembly.
//!
//! Listing calls never fail. A locked store, a malformed row, or an
//! unparsable blob each degrade to fewer results, never to an error.

pub mod attachments;
pub mod types;

pub use types::Message;

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::CONFIG;
use crate::decode::{self, clean_text, DecodedContent};
use crate::error::{CoreError, CoreResult};
use crate::phone;
use crate::sender::MessageSender;
use crate::store::{gate, query, MessageStore, RawMessageRow};
use crate::utils::retry_operation;

/// Substituted when a row carries attachments but no recoverable text.
pub const NO_TEXT_SENTINEL: &str = "[No text content]";

pub struct MessageService {
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MessageSender>,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self { store, sender }
    }

    /// Messages exchanged with one correspondent, newest first.
    pub async fn read_by_phone(&self, phone_number: &str, limit: u32) -> Vec<Message> {
        if !self.ensure_access().await {
            return Vec::new();
        }

        let variants = phone::normalize(phone_number);
        info!("Trying phone formats: {variants:?}");
        self.run_listing(&query::by_sender(&variants, limit), false)
            .await
    }

    /// Inbound messages still flagged unread, newest first.
    pub async fn read_unread(&self, limit: u32) -> Vec<Message> {
        if !self.ensure_access().await {
            return Vec::new();
        }
        self.run_listing(&query::unread(limit), false).await
    }

    /// Most recent messages across all conversations; outbound rows report
    /// `"me"` as the sender.
    pub async fn read_recent(&self, limit: u32) -> Vec<Message> {
        if !self.ensure_access().await {
            return Vec::new();
        }
        self.run_listing(&query::recent(limit), true).await
    }

    /// Direct send path: one actuator invocation, error propagated.
    pub async fn send_message(&self, phone_number: &str, text: &str) -> CoreResult<String> {
        self.sender.send(phone_number, text).await
    }

    /// Gate check under the generic retry policy. Exhaustion is recovered at
    /// the call site: reads degrade to an empty listing.
    async fn ensure_access(&self) -> bool {
        retry_operation(
            || {
                let store = Arc::clone(&self.store);
                async move {
                    if gate::check_access(store.as_ref()).await {
                        Ok(())
                    } else {
                        Err(CoreError::AccessDenied)
                    }
                }
            },
            CONFIG.retry_max_attempts,
            CONFIG.retry_delay(),
        )
        .await
        .is_ok()
    }

    async fn run_listing(&self, sql: &str, me_for_outbound: bool) -> Vec<Message> {
        let rows = retry_operation(
            || {
                let store = Arc::clone(&self.store);
                let sql = sql.to_string();
                async move { store.query_rows(&sql).await }
            },
            CONFIG.retry_max_attempts,
            CONFIG.retry_delay(),
        )
        .await;

        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => {
                error!("Store query failed after retries: {e}");
                return Vec::new();
            }
        };

        if rows.is_empty() {
            info!("No messages matched the query");
            return Vec::new();
        }

        // Strict per-row parse: a malformed row is dropped, not the batch.
        // Rows with neither content nor attachments are dropped before
        // assembly.
        let parsed: Vec<RawMessageRow> = rows
            .iter()
            .filter_map(|value| match RawMessageRow::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Skipping malformed row: {e}");
                    None
                }
            })
            .filter(|row| row.content.is_some() || row.has_attachments)
            .collect();

        // Attachment lookups fan out concurrently across rows; join_all is
        // positional, so the store's descending-timestamp order is preserved.
        join_all(
            parsed
                .into_iter()
                .map(|row| self.assemble(row, me_for_outbound)),
        )
        .await
    }

    async fn assemble(&self, row: RawMessageRow, me_for_outbound: bool) -> Message {
        let raw = row.content.as_deref().unwrap_or_default();
        let DecodedContent { mut text, url } = decode::decode(row.content_kind, raw);

        let attachments = if row.has_attachments {
            attachments::resolve(self.store.as_ref(), row.message_id).await
        } else {
            Vec::new()
        };

        if let Some(subject) = row.subject.as_deref().filter(|s| !s.is_empty()) {
            text = format!("Subject: {subject}\n{text}");
        }

        let mut content = clean_text(&text);
        if content.is_empty() {
            content = NO_TEXT_SENTINEL.to_string();
        }

        if !attachments.is_empty() {
            content.push_str(&format!("\n[Attachments: {}]", attachments.len()));
        }
        if let Some(url) = &url {
            content.push_str(&format!("\n[URL: {url}]"));
        }

        let sender = if me_for_outbound && row.is_from_me {
            "me".to_string()
        } else {
            row.sender.clone()
        };

        Message {
            content,
            date: to_iso8601(&row.date),
            sender,
            is_from_me: row.is_from_me,
            attachments: (!attachments.is_empty()).then_some(attachments),
            url,
        }
    }
}

/// Convert the store's local-time `YYYY-MM-DD HH:MM:SS` timestamp to an
/// ISO-8601 UTC instant. An unparseable value passes through verbatim rather
/// than dropping the row.
fn to_iso8601(local_ts: &str) -> String {
    let Ok(naive) = NaiveDateTime::parse_from_str(local_ts, "%Y-%m-%d %H:%M:%S") else {
        return local_ts.to_string();
    };
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
        None => local_ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso8601_conversion_is_utc_with_millis() {
        let converted = to_iso8601("2024-03-01 12:34:56");
        assert!(converted.ends_with('Z'), "not UTC: {converted}");
        assert!(converted.contains('T'));
        assert_eq!(converted.len(), "2024-03-01T12:34:56.000Z".len());
    }

    #[test]
    fn unparseable_timestamp_passes_through() {
        assert_eq!(to_iso8601("not a date"), "not a date");
        assert_eq!(to_iso8601(""), "");
    }
}
