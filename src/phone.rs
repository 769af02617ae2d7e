// src/phone.rs
//! Phone number normalization.
//!
//! The store's handle column holds an inconsistent mix of raw and E.164-like
//! forms. North-American 10/11-digit inputs map to exactly one canonical form;
//! anything else still yields one best-guess candidate rather than failing.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_E164_US: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+1\d{10}$").expect("valid regex"));
static RE_COUNTRY_US: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1\d{10}$").expect("valid regex"));
static RE_BARE_US: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

/// Expand a caller-supplied phone string into the ordered, duplicate-free
/// list of candidate handle values used to build the store's match clause.
pub fn normalize(input: &str) -> Vec<String> {
    // Strip everything except digits and a leading `+`.
    let mut cleaned = String::new();
    for c in input.chars().filter(|c| c.is_ascii_digit() || *c == '+') {
        if c.is_ascii_digit() || cleaned.is_empty() {
            cleaned.push(c);
        }
    }

    if RE_E164_US.is_match(&cleaned) {
        return vec![cleaned];
    }
    if RE_COUNTRY_US.is_match(&cleaned) {
        return vec![format!("+{cleaned}")];
    }
    if RE_BARE_US.is_match(&cleaned) {
        return vec![format!("+1{cleaned}")];
    }

    // Ambiguous or international input: one best-guess candidate.
    let candidate = if cleaned.starts_with("+1") {
        cleaned
    } else if cleaned.starts_with('1') {
        format!("+{cleaned}")
    } else {
        format!("+1{cleaned}")
    };
    vec![candidate]
}
