// src/store/query.rs
// Read-query construction for the message log.
//
// All three listing shapes share one projection. The `content_type` CASE
// discriminant (0 = literal text, 1 = hex-encoded blob, 2 = neither) is
// computed here so the decoder never re-inspects raw column semantics, and
// `m.date` is converted from the store's nanosecond Apple epoch to a
// local-time string in the same breath.

/// Shared SELECT with the given extra filter spliced into the WHERE clause.
fn select_messages(filter: &str, limit: u32) -> String {
    format!(
        "SELECT \
            m.ROWID as message_id, \
            CASE \
                WHEN m.text IS NOT NULL AND m.text != '' THEN m.text \
                WHEN m.attributedBody IS NOT NULL THEN hex(m.attributedBody) \
                ELSE NULL \
            END as content, \
            datetime(m.date/1000000000 + strftime('%s', '2001-01-01'), 'unixepoch', 'localtime') as date, \
            h.id as sender, \
            m.is_from_me, \
            m.is_audio_message, \
            m.cache_has_attachments, \
            m.subject, \
            CASE \
                WHEN m.text IS NOT NULL AND m.text != '' THEN 0 \
                WHEN m.attributedBody IS NOT NULL THEN 1 \
                ELSE 2 \
            END as content_type \
        FROM message m \
        INNER JOIN handle h ON h.ROWID = m.handle_id \
        WHERE {filter} \
            AND (m.text IS NOT NULL OR m.attributedBody IS NOT NULL OR m.cache_has_attachments = 1) \
            AND m.is_audio_message = 0 \
            AND m.item_type = 0 \
        ORDER BY m.date DESC \
        LIMIT {limit}"
    )
}

/// Rows whose handle matches any of the normalized phone variants.
pub fn by_sender(phone_variants: &[String], limit: u32) -> String {
    let phone_list = phone_variants
        .iter()
        .map(|p| format!("'{}'", escape_single_quotes(p)))
        .collect::<Vec<_>>()
        .join(",");
    select_messages(
        &format!("h.id IN ({phone_list}) AND m.is_from_me IS NOT NULL"),
        limit,
    )
}

/// Inbound rows still flagged unread.
pub fn unread(limit: u32) -> String {
    select_messages("m.is_from_me = 0 AND m.is_read = 0", limit)
}

/// Most recent rows across all conversations.
pub fn recent(limit: u32) -> String {
    select_messages("1 = 1", limit)
}

/// Attachment filenames joined through the message-attachment link table.
pub fn attachments_for(message_id: i64) -> String {
    format!(
        "SELECT filename \
        FROM attachment \
        INNER JOIN message_attachment_join \
        ON attachment.ROWID = message_attachment_join.attachment_id \
        WHERE message_attachment_join.message_id = {message_id}"
    )
}

/// Single-quote doubling is the only escaping discipline for embedded values.
fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "''")
}
