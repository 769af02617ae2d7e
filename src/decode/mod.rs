// src/decode/mod.rs
//! Best-effort recovery of readable text and URLs from message content.
//!
//! The legacy binary body encoding is a semi-structured serialization that is
//! not worth parsing losslessly; an ordered list of heuristic patterns
//! recovers "probably human text", with a scrub-and-salvage pass and a fixed
//! sentinel behind it. Plain text only needs artifact scrubbing and a URL
//! scan.

pub mod clean;

pub use clean::{clean_text, clean_url};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::store::ContentKind;

/// Fixed sentinel when nothing readable can be recovered from a binary body.
pub const UNREADABLE_SENTINEL: &str = "[Message content not readable]";

/// A heuristic capture shorter than this is noise, not message text.
const MIN_SUBSTANTIAL_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub text: String,
    pub url: Option<String>,
}

/// Ordered extraction patterns for the legacy binary body. Evaluated in
/// sequence with early exit on the first substantial capture; new patterns
/// are additive, appended in priority order.
static TEXT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"NSString">(.*?)<"#,                  // tagged string
        r#"NSString">([^<]+)"#,                 // tagged string, unterminated
        r#"NSNumber">\d+<.*?NSString">(.*?)<"#, // numeric-then-string sequence
        r#"NSArray">.*?NSString">(.*?)<"#,      // array-embedded string
        r#""string":\s*"([^"]+)""#,             // JSON-style pair
        r#"text[^>]*>(.*?)<"#,                  // generic tag-delimited text
        r#"message>(.*?)<"#,                    // generic message wrapping
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Ordered URL recovery patterns for the same decoded byte-text.
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(https?://[^\s<"]+)"#,           // bare URL
        r#"NSString">(https?://[^\s<"]+)"#, // URL in a tagged string
        r#""url":\s*"(https?://[^"]+)""#,   // URL in a JSON field
        r#"link[^>]*>(https?://[^<]+)"#,    // URL in a link tag
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

// URL scan for plain-text bodies; broader terminator set than the binary one.
static RE_PLAIN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://[^\s]+)").expect("valid regex"));

// Structural markers stripped in the salvage pass.
static RE_STREAMTYPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"streamtyped.*?NSString").expect("valid regex"));
static RE_ATTRIBUTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"NSAttributedString.*?NSString").expect("valid regex"));
static RE_SALVAGE_DICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)NSDictionary.*$").expect("valid regex"));
static RE_PLUS_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+[A-Za-z]+\s").expect("valid regex"));
static RE_NUMBER_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"NSNumber.*?NSValue.*?\*").expect("valid regex"));
static RE_NON_PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E\x{00A0}-\x{10FFFF}]").expect("valid regex"));
static RE_MULTI_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Recover readable text and an optional URL from one content cell.
///
/// The returned `text` is never the raw undecoded blob and never empty for
/// `Plain`/`Binary` content: recovered text, the URL itself, or the sentinel.
pub fn decode(kind: ContentKind, raw: &str) -> DecodedContent {
    match kind {
        ContentKind::Plain => decode_plain(raw),
        ContentKind::Binary => decode_binary(raw),
        ContentKind::Absent => DecodedContent {
            text: String::new(),
            url: None,
        },
    }
}

fn decode_plain(raw: &str) -> DecodedContent {
    let text = clean_text(raw);
    let url = RE_PLAIN_URL
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| clean_url(m.as_str()));
    DecodedContent { text, url }
}

fn decode_binary(hex_blob: &str) -> DecodedContent {
    let bytes = match hex::decode(hex_blob.trim()) {
        Ok(bytes) => bytes,
        Err(_) => {
            return DecodedContent {
                text: UNREADABLE_SENTINEL.to_string(),
                url: None,
            };
        }
    };
    let content = String::from_utf8_lossy(&bytes);

    // First substantial capture wins; a short capture is kept as a candidate
    // in case no later pattern does better.
    let mut text = String::new();
    for pattern in TEXT_PATTERNS.iter() {
        if let Some(m) = pattern.captures(&content).and_then(|c| c.get(1)) {
            if !m.as_str().is_empty() {
                text = m.as_str().to_string();
                if text.len() > MIN_SUBSTANTIAL_LEN {
                    break;
                }
            }
        }
    }

    let mut url: Option<String> = None;
    for pattern in URL_PATTERNS.iter() {
        if let Some(m) = pattern.captures(&content).and_then(|c| c.get(1)) {
            if !m.as_str().is_empty() {
                url = Some(clean_url(m.as_str()));
                break;
            }
        }
    }

    if text.is_empty() && url.is_none() {
        let salvaged = salvage_readable_text(&content);
        if salvaged.len() > MIN_SUBSTANTIAL_LEN {
            text = salvaged;
        } else {
            return DecodedContent {
                text: UNREADABLE_SENTINEL.to_string(),
                url: None,
            };
        }
    }

    let mut text = clean_text(&text);
    if text.is_empty() {
        text = match &url {
            Some(url) => url.clone(),
            None => UNREADABLE_SENTINEL.to_string(),
        };
    }

    DecodedContent { text, url }
}

/// Last-resort pass: strip the known structural markers and keep whatever
/// printable text is left, if there is enough of it to mean anything.
fn salvage_readable_text(content: &str) -> String {
    let stripped = RE_STREAMTYPED.replace_all(content, "");
    let stripped = RE_ATTRIBUTED.replace_all(&stripped, "");
    let stripped = RE_SALVAGE_DICT.replace_all(&stripped, "");
    let stripped = RE_PLUS_IDENT.replace_all(&stripped, "");
    let stripped = RE_NUMBER_VALUE.replace_all(&stripped, "");
    let stripped = RE_NON_PRINTABLE.replace_all(&stripped, " ");
    let stripped = RE_MULTI_WS.replace_all(&stripped, " ");
    stripped.trim().to_string()
}
