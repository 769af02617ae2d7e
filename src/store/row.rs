// src/store/row.rs
// Strict row parsing: a malformed row fails alone, never the batch.

use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Which form the content cell arrived in, per the query's discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Plain,
    Binary,
    Absent,
}

/// One store-returned record, validated field by field before construction.
#[derive(Debug, Clone)]
pub struct RawMessageRow {
    pub message_id: i64,
    pub content: Option<String>,
    pub date: String,
    pub sender: String,
    pub is_from_me: bool,
    pub is_audio_message: bool,
    pub has_attachments: bool,
    pub subject: Option<String>,
    pub content_kind: ContentKind,
}

impl RawMessageRow {
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::RowShape("row is not an object".into()))?;

        let content_kind = match require_i64(obj, "content_type")? {
            0 => ContentKind::Plain,
            1 => ContentKind::Binary,
            2 => ContentKind::Absent,
            other => {
                return Err(CoreError::RowShape(format!("unknown content_type {other}")));
            }
        };

        Ok(Self {
            message_id: require_i64(obj, "message_id")?,
            content: optional_string(obj, "content")?,
            date: require_string(obj, "date")?,
            sender: require_string(obj, "sender")?,
            is_from_me: flag(obj, "is_from_me")?,
            is_audio_message: flag(obj, "is_audio_message")?,
            has_attachments: flag(obj, "cache_has_attachments")?,
            subject: optional_string(obj, "subject")?,
            content_kind,
        })
    }
}

fn require_i64(obj: &Map<String, Value>, key: &str) -> CoreResult<i64> {
    obj.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::RowShape(format!("missing or non-integer field `{key}`")))
}

fn require_string(obj: &Map<String, Value>, key: &str) -> CoreResult<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoreError::RowShape(format!("missing or non-text field `{key}`")))
}

/// A nullable text column: the key must be present, NULL maps to `None`.
fn optional_string(obj: &Map<String, Value>, key: &str) -> CoreResult<Option<String>> {
    match obj.get(key) {
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CoreError::RowShape(format!("non-text field `{key}`"))),
        None => Err(CoreError::RowShape(format!("missing field `{key}`"))),
    }
}

/// A 0/1 flag column; the store leaves some of these NULL on old rows, which
/// reads as unset.
fn flag(obj: &Map<String, Value>, key: &str) -> CoreResult<bool> {
    match obj.get(key) {
        Some(Value::Null) => Ok(false),
        Some(v) => v
            .as_i64()
            .map(|n| n != 0)
            .ok_or_else(|| CoreError::RowShape(format!("non-integer flag `{key}`"))),
        None => Err(CoreError::RowShape(format!("missing field `{key}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "message_id": 7,
            "content": "hello",
            "date": "2024-03-01 12:34:56",
            "sender": "+15551234567",
            "is_from_me": 0,
            "is_audio_message": 0,
            "cache_has_attachments": 1,
            "subject": null,
            "content_type": 0,
        })
    }

    #[test]
    fn parses_a_complete_row() {
        let row = RawMessageRow::from_value(&sample()).unwrap();
        assert_eq!(row.message_id, 7);
        assert_eq!(row.content.as_deref(), Some("hello"));
        assert_eq!(row.sender, "+15551234567");
        assert!(!row.is_from_me);
        assert!(row.has_attachments);
        assert_eq!(row.subject, None);
        assert_eq!(row.content_kind, ContentKind::Plain);
    }

    #[test]
    fn null_content_maps_to_none() {
        let mut v = sample();
        v["content"] = Value::Null;
        v["content_type"] = json!(2);
        let row = RawMessageRow::from_value(&v).unwrap();
        assert_eq!(row.content, None);
        assert_eq!(row.content_kind, ContentKind::Absent);
    }

    #[test]
    fn null_flags_read_as_unset() {
        let mut v = sample();
        v["is_from_me"] = Value::Null;
        let row = RawMessageRow::from_value(&v).unwrap();
        assert!(!row.is_from_me);
    }

    #[test]
    fn missing_field_fails_the_row() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("sender");
        let err = RawMessageRow::from_value(&v).unwrap_err();
        assert!(err.to_string().contains("sender"));
    }

    #[test]
    fn unknown_discriminant_fails_the_row() {
        let mut v = sample();
        v["content_type"] = json!(9);
        assert!(RawMessageRow::from_value(&v).is_err());
    }

    #[test]
    fn non_object_row_fails() {
        assert!(RawMessageRow::from_value(&json!([1, 2, 3])).is_err());
    }
}
