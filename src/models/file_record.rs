//! Represents a file known to the registry.

use crate::models::object::ObjectSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Content type recorded for files recovered from a listing.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Where a record's metadata came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Created by an upload through this process; all fields are authoritative.
    #[default]
    Uploaded,

    /// Rebuilt from a bucket listing. `original_name` and `mime_type` are
    /// fallbacks, since the listing does not carry them.
    Recovered,
}

/// Metadata for one uploaded file.
///
/// The blob itself lives in the object store under `object_key`; this struct
/// only describes it.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Sequence number assigned by the registry. Not stable across restarts.
    pub id: u64,

    /// Filename supplied by the uploader, or the object key after recovery.
    pub original_name: String,

    /// Key of the blob inside the bucket.
    pub object_key: String,

    /// Declared content type, or [`FALLBACK_MIME_TYPE`] after recovery.
    pub mime_type: String,

    /// Size in bytes.
    pub size: u64,

    /// Upload time, or the store's last-modified time after recovery.
    pub uploaded_at: DateTime<Utc>,

    #[serde(skip)]
    pub origin: RecordOrigin,
}

impl FileRecord {
    /// Record for a file this process just wrote to the store.
    ///
    /// `id` is left at 0; the registry assigns the real one on append.
    pub fn uploaded(
        original_name: impl Into<String>,
        object_key: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id: 0,
            original_name: original_name.into(),
            object_key: object_key.into(),
            mime_type: mime_type.into(),
            size,
            uploaded_at: Utc::now(),
            origin: RecordOrigin::Uploaded,
        }
    }

    /// Record rebuilt from a listing entry.
    ///
    /// The uploader's filename and content type are not recoverable: the
    /// object key stands in for the name and the content type becomes
    /// [`FALLBACK_MIME_TYPE`]. A missing modification time falls back to `now`.
    pub fn recovered(object: ObjectSummary, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            original_name: object.key.clone(),
            object_key: object.key,
            mime_type: FALLBACK_MIME_TYPE.to_string(),
            size: object.size,
            uploaded_at: object.last_modified.unwrap_or(now),
            origin: RecordOrigin::Recovered,
        }
    }
}
