//! Represents an object as reported by the store's listing.

use chrono::{DateTime, Utc};

/// One entry of a bucket listing.
///
/// Listings only carry the object's name, size and modification time; the
/// content type and any user metadata written at upload are not included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key (the name the store addresses the blob by).
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// Last-modified time reported by the store, if it could be parsed.
    pub last_modified: Option<DateTime<Utc>>,
}

/// A single page of a flat bucket listing.
#[derive(Clone, Debug, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,

    /// Token for the next page; `None` once the listing is exhausted.
    pub next_continuation_token: Option<String>,
}
