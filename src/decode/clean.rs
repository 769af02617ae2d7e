// src/decode/clean.rs
// Artifact scrubbing for recovered text and URLs.

use once_cell::sync::Lazy;
use regex::Regex;

// Everything from a marker onward is serialization metadata, not message text.
static RE_TRAILING_II: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*iI\s*.*$").expect("valid regex"));
static RE_NSDICTIONARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*NSDictionary.*$").expect("valid regex"));
static RE_NSDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*NSData.*$").expect("valid regex"));
static RE_BPLIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*bplist00.*$").expect("valid regex"));
static RE_KIM_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*__kIM[A-Za-z]+.*$").expect("valid regex"));
static RE_ARCHIVE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*X\$version.*$").expect("valid regex"));
static RE_BRACKET_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*\[\d+c\].*$").expect("valid regex"));

static RE_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x9F]").expect("valid regex"));
static RE_REPLACEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x{FFFD}+").expect("valid regex"));
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static RE_URL_GARBAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\x{FFFD}.*$").expect("valid regex"));
static RE_URL_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)[\x00-\x1F\x7F-\x9F].*$").expect("valid regex"));
static RE_URL_TRAILING_II: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)iI.*$").expect("valid regex"));
static RE_URL_TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!?.,;:]+$").expect("valid regex"));

/// Remove serialization artifacts and metadata from recovered text, keeping
/// visible Unicode (including emoji). Idempotent.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = RE_TRAILING_II.replace(text, "");
    let cleaned = RE_NSDICTIONARY.replace(&cleaned, "");
    let cleaned = RE_NSDATA.replace(&cleaned, "");
    let cleaned = RE_BPLIST.replace(&cleaned, "");
    let cleaned = RE_KIM_KEY.replace(&cleaned, "");
    let cleaned = RE_ARCHIVE_VERSION.replace(&cleaned, "");
    let cleaned = RE_BRACKET_COUNT.replace(&cleaned, "");
    let cleaned = RE_CONTROL.replace_all(&cleaned, "");
    let cleaned = RE_REPLACEMENT.replace_all(&cleaned, "");
    let cleaned = RE_WHITESPACE.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}

/// Stop a URL at the first garbage or control character (or a trailing `iI`
/// marker), then drop trailing whitespace and sentence punctuation.
pub fn clean_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let cleaned = RE_URL_GARBAGE.replace(url, "");
    let cleaned = RE_URL_CONTROL.replace(&cleaned, "");
    let cleaned = RE_URL_TRAILING_II.replace(&cleaned, "");
    let cleaned = RE_URL_TRAILING_PUNCT.replace(cleaned.trim_end(), "");
    cleaned.to_string()
}
