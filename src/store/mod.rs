// src/store/mod.rs
//! Read-only access to the local Messages store.
//!
//! The store itself is reached only through an external accessor: this module
//! composes query text, probes reachability, and parses the JSON rows the
//! accessor returns. It never opens the database file directly.

pub mod accessor;
pub mod gate;
pub mod query;
pub mod row;

pub use accessor::{default_store_path, MessageStore, SqliteCliStore};
pub use row::{ContentKind, RawMessageRow};
