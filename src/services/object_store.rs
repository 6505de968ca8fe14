//! The seam between the file service and the S3-compatible store.
//!
//! Everything the service needs from the store goes through [`ObjectStore`],
//! so the production client (`S3ObjectStore`) and the in-memory store used in
//! tests are interchangeable.

use crate::models::object::ObjectPage;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    S3(#[from] s3::error::S3Error),
    #[error("{operation} returned unexpected status {status}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Descriptive metadata written alongside an uploaded blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadMetadata {
    pub content_type: String,
    pub original_name: String,
}

/// Operations against the single bucket this process serves.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket every call targets.
    fn bucket_name(&self) -> &str;

    async fn bucket_exists(&self) -> StoreResult<bool>;

    async fn create_bucket(&self) -> StoreResult<()>;

    /// Write `body` under `key`, attaching `metadata` to the object.
    async fn put_object(&self, key: &str, body: Bytes, metadata: &UploadMetadata)
    -> StoreResult<()>;

    /// Fetch one page of a flat (recursive) listing of the whole bucket.
    ///
    /// Pass the previous page's `next_continuation_token` to continue.
    async fn list_page(&self, continuation_token: Option<String>) -> StoreResult<ObjectPage>;

    /// Presign a GET for `key` valid for `expiry_secs` seconds.
    ///
    /// Existence of `key` is not checked; a missing object only shows up when
    /// the URL is dereferenced.
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> StoreResult<String>;
}

/// Map a non-2xx status from the store into an error.
pub(crate) fn ensure_success(operation: &'static str, status: u16) -> StoreResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StoreError::UnexpectedStatus { operation, status })
    }
}

/// Interpret the status of a bucket lookup: 200 means present, 404 absent.
pub(crate) fn bucket_presence(operation: &'static str, status: u16) -> StoreResult<bool> {
    match status {
        200 => Ok(true),
        404 => Ok(false),
        other => ensure_success(operation, other).map(|()| true),
    }
}
