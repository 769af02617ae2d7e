// tests/message_pipeline.rs
// End-to-end listing pipeline against in-memory store and sender doubles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use courier::error::{CoreError, CoreResult};
use courier::messages::MessageService;
use courier::sender::MessageSender;
use courier::store::{gate, MessageStore};

/// Store double: canned rows for message queries, separate canned rows for
/// the attachment join, or a forced error on everything.
struct FakeStore {
    path: PathBuf,
    rows: Vec<Value>,
    attachment_rows: Vec<Value>,
    fail: bool,
}

impl FakeStore {
    fn with_rows(path: &Path, rows: Vec<Value>) -> Self {
        Self {
            path: path.to_path_buf(),
            rows,
            attachment_rows: Vec::new(),
            fail: false,
        }
    }
}

#[async_trait]
impl MessageStore for FakeStore {
    fn store_path(&self) -> &Path {
        &self.path
    }

    async fn query_rows(&self, sql: &str) -> CoreResult<Vec<Value>> {
        if self.fail {
            return Err(CoreError::Store("database is locked".into()));
        }
        if sql == "SELECT 1;" {
            return Ok(vec![json!({"1": 1})]);
        }
        if sql.contains("message_attachment_join") {
            return Ok(self.attachment_rows.clone());
        }
        Ok(self.rows.clone())
    }
}

struct NullSender;

#[async_trait]
impl MessageSender for NullSender {
    async fn send(&self, _recipient: &str, _text: &str) -> CoreResult<String> {
        Ok(String::new())
    }
}

fn row(id: i64, content: Option<&str>, content_type: i64, has_attachments: i64) -> Value {
    json!({
        "message_id": id,
        "content": content,
        "date": "2024-03-01 12:34:56",
        "sender": "+15551234567",
        "is_from_me": 0,
        "is_audio_message": 0,
        "cache_has_attachments": has_attachments,
        "subject": null,
        "content_type": content_type,
    })
}

fn service_with(store: FakeStore) -> MessageService {
    MessageService::new(Arc::new(store), Arc::new(NullSender))
}

#[tokio::test]
async fn row_with_no_content_and_no_attachments_is_dropped() {
    let db = NamedTempFile::new().unwrap();
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![row(1, None, 2, 0)],
    ));

    let messages = service.read_by_phone("5551234567", 10).await;
    assert!(messages.is_empty());
}

#[tokio::test]
async fn plain_text_url_is_extracted_and_appended() {
    let db = NamedTempFile::new().unwrap();
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![row(1, Some("Check this out https://example.com/x!!"), 0, 0)],
    ));

    let messages = service.read_by_phone("5551234567", 10).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].url.as_deref(), Some("https://example.com/x"));
    assert_eq!(
        messages[0].content,
        "Check this out https://example.com/x!!\n[URL: https://example.com/x]"
    );
}

#[tokio::test]
async fn binary_body_is_decoded_through_the_full_pipeline() {
    let blob = hex::encode("\u{04}streamtyped\u{01}NSString\">Hello there<\u{02}iI junk");
    let db = NamedTempFile::new().unwrap();
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![row(1, Some(&blob), 1, 0)],
    ));

    let messages = service.read_unread(10).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "Hello there");
}

#[tokio::test]
async fn attachments_are_resolved_and_counted() {
    let db = NamedTempFile::new().unwrap();
    let mut store = FakeStore::with_rows(db.path(), vec![row(1, None, 2, 1)]);
    store.attachment_rows = vec![
        json!({"filename": "~/Library/Messages/Attachments/ab/photo.heic"}),
        json!({"filename": "~/Library/Messages/Attachments/cd/video.mov"}),
    ];
    let service = service_with(store);

    let messages = service.read_by_phone("5551234567", 10).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].content,
        "[No text content]\n[Attachments: 2]"
    );
    assert_eq!(
        messages[0].attachments.as_ref().map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn subject_is_prepended_before_final_cleanup() {
    let db = NamedTempFile::new().unwrap();
    let mut value = row(1, Some("running late"), 0, 0);
    value["subject"] = json!("Dinner");
    let service = service_with(FakeStore::with_rows(db.path(), vec![value]));

    let messages = service.read_by_phone("5551234567", 10).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "Subject: Dinner running late");
}

#[tokio::test]
async fn recent_listing_reports_me_for_outbound_rows() {
    let db = NamedTempFile::new().unwrap();
    let mut outbound = row(1, Some("on my way"), 0, 0);
    outbound["is_from_me"] = json!(1);
    let inbound = row(2, Some("see you soon"), 0, 0);
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![outbound.clone(), inbound],
    ));

    let messages = service.read_recent(20).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "me");
    assert!(messages[0].is_from_me);
    assert_eq!(messages[1].sender, "+15551234567");

    // The by-phone listing keeps the literal handle even for outbound rows.
    let service = service_with(FakeStore::with_rows(db.path(), vec![outbound]));
    let messages = service.read_by_phone("5551234567", 10).await;
    assert_eq!(messages[0].sender, "+15551234567");
}

#[tokio::test]
async fn listing_preserves_store_order_and_converts_dates() {
    let db = NamedTempFile::new().unwrap();
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![
            row(3, Some("third"), 0, 0),
            row(2, Some("second"), 0, 0),
            row(1, Some("first"), 0, 0),
        ],
    ));

    let messages = service.read_recent(20).await;
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
    for message in &messages {
        assert!(message.date.ends_with('Z'), "date not UTC: {}", message.date);
    }
}

#[tokio::test]
async fn malformed_row_is_skipped_not_fatal() {
    let db = NamedTempFile::new().unwrap();
    let service = service_with(FakeStore::with_rows(
        db.path(),
        vec![json!({"unexpected": "shape"}), row(1, Some("survivor"), 0, 0)],
    ));

    let messages = service.read_recent(20).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "survivor");
}

#[tokio::test]
async fn failing_store_recovers_to_empty_listing() {
    let db = NamedTempFile::new().unwrap();
    let mut store = FakeStore::with_rows(db.path(), vec![row(1, Some("hi"), 0, 0)]);
    store.fail = true;
    let service = service_with(store);

    assert!(service.read_by_phone("5551234567", 10).await.is_empty());
    assert!(service.read_unread(10).await.is_empty());
    assert!(service.read_recent(20).await.is_empty());
}

#[tokio::test]
async fn gate_rejects_a_missing_store_file() {
    let missing = PathBuf::from("/nonexistent/chat.db");
    let store = FakeStore::with_rows(&missing, Vec::new());
    assert!(!gate::check_access(&store).await);

    let db = NamedTempFile::new().unwrap();
    let store = FakeStore::with_rows(db.path(), Vec::new());
    assert!(gate::check_access(&store).await);
}
