// src/messages/attachments.rs
// Attachment filename resolution, recovered to empty on any failure.

use tracing::warn;

use crate::store::{query, MessageStore};

/// Join attachment filenames for one message by its row id. Any query failure
/// is logged and recovered as an empty list; one bad lookup never aborts a
/// listing.
pub async fn resolve(store: &dyn MessageStore, message_id: i64) -> Vec<String> {
    let sql = query::attachments_for(message_id);
    match store.query_rows(&sql).await {
        Ok(rows) => rows
            .iter()
            .filter_map(|row| row.get("filename").and_then(|v| v.as_str()))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            warn!("Failed to resolve attachments for message {message_id}: {e}");
            Vec::new()
        }
    }
}
