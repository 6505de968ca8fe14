//! src/services/storage_service.rs
//!
//! StorageService — the file front-end's core operations. Blobs live in the
//! S3-compatible store behind [`ObjectStore`]; metadata lives in the
//! in-memory [`FileRegistry`], which is rebuilt from a bucket listing at
//! startup and appended to after every confirmed upload.

use crate::{
    models::file_record::FileRecord,
    services::{
        object_store::{ObjectStore, StoreResult, UploadMetadata},
        registry::FileRegistry,
    },
};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Lifetime of every issued download link.
pub const LINK_TTL_SECS: u32 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketStatus {
    AlreadyExists,
    Created,
}

/// Outcome of rebuilding the registry from the bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// Records installed in the registry.
    pub records: usize,

    /// `false` when the listing failed part-way; `records` then covers only
    /// the pages received before the failure.
    pub complete: bool,
}

/// StorageService provides the operations behind the HTTP surface:
/// - Ensure the bucket exists (startup)
/// - Rebuild the registry from the bucket (startup)
/// - Upload a file (store write, then registry append)
/// - Issue a presigned download link
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn ObjectStore>,
    registry: Arc<FileRegistry>,
}

impl StorageService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            registry: Arc::new(FileRegistry::new()),
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// One-time startup sequence: bucket check, then registry sync.
    ///
    /// Failures are logged and swallowed so the HTTP surface still comes up;
    /// later store calls then fail per request.
    pub async fn start(&self) -> SyncReport {
        match self.init_bucket().await {
            Ok(BucketStatus::AlreadyExists) => {
                info!("Bucket '{}' already exists.", self.store.bucket_name())
            }
            Ok(BucketStatus::Created) => {
                info!("Bucket '{}' created successfully.", self.store.bucket_name())
            }
            Err(err) => error!(
                bucket = self.store.bucket_name(),
                "error ensuring bucket exists: {}", err
            ),
        }

        let report = self.sync_registry().await;
        info!(
            records = report.records,
            complete = report.complete,
            "registry synced from bucket"
        );
        report
    }

    /// Create the bucket unless it already exists. Safe to call repeatedly.
    pub async fn init_bucket(&self) -> StoreResult<BucketStatus> {
        if self.store.bucket_exists().await? {
            return Ok(BucketStatus::AlreadyExists);
        }
        self.store.create_bucket().await?;
        Ok(BucketStatus::Created)
    }

    /// Replace the registry with one recovered record per object in the bucket.
    ///
    /// Pages are walked until the listing is exhausted. If a page fails, the
    /// error is logged and the records gathered so far are installed anyway.
    pub async fn sync_registry(&self) -> SyncReport {
        let now = Utc::now();
        let mut recovered = Vec::new();
        let mut token = None;
        let mut complete = true;

        loop {
            match self.store.list_page(token.take()).await {
                Ok(page) => {
                    recovered.extend(
                        page.objects
                            .into_iter()
                            .map(|object| FileRecord::recovered(object, now)),
                    );
                    match page.next_continuation_token {
                        Some(next) => token = Some(next),
                        None => break,
                    }
                }
                Err(err) => {
                    error!(
                        bucket = self.store.bucket_name(),
                        recovered = recovered.len(),
                        "error syncing files from store: {}",
                        err
                    );
                    complete = false;
                    break;
                }
            }
        }

        let records = self.registry.replace(recovered).await;
        SyncReport { records, complete }
    }

    /// Store `body` under a fresh random key and register it.
    ///
    /// The registry is only touched once the store confirms the write, so a
    /// failed upload leaves no entry behind.
    pub async fn upload(
        &self,
        original_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> StoreResult<FileRecord> {
        let object_key = Uuid::new_v4().to_string();
        let size = body.len() as u64;
        let metadata = UploadMetadata {
            content_type: content_type.to_string(),
            original_name: original_name.to_string(),
        };

        self.store.put_object(&object_key, body, &metadata).await?;

        let record = self
            .registry
            .append(FileRecord::uploaded(
                original_name,
                object_key,
                content_type,
                size,
            ))
            .await;
        info!(
            id = record.id,
            key = %record.object_key,
            origin = ?record.origin,
            size = record.size,
            "uploaded '{}'",
            record.original_name
        );
        Ok(record)
    }

    /// Presign a download link for `object_key`, valid for [`LINK_TTL_SECS`].
    ///
    /// The registry is not consulted; unknown keys still get a URL, which
    /// the store will reject when it is used.
    pub async fn issue_link(&self, object_key: &str) -> StoreResult<String> {
        self.store.presign_get(object_key, LINK_TTL_SECS).await
    }

    pub async fn list_files(&self) -> Vec<FileRecord> {
        self.registry.snapshot().await
    }
}
