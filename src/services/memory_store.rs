//! In-memory [`ObjectStore`] with failure injection, used by tests.

use crate::{
    models::object::{ObjectPage, ObjectSummary},
    services::object_store::{ObjectStore, StoreError, StoreResult, UploadMetadata},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

#[derive(Clone, Debug)]
pub struct StoredBlob {
    pub body: Bytes,
    pub metadata: Option<UploadMetadata>,
    pub last_modified: DateTime<Utc>,
}

pub struct MemoryStore {
    bucket: String,
    bucket_created: AtomicBool,
    objects: Mutex<BTreeMap<String, StoredBlob>>,
    page_size: usize,
    pub create_calls: AtomicUsize,
    pub fail_bucket_check: AtomicBool,
    pub fail_puts: AtomicBool,
    pub fail_presign: AtomicBool,
    /// Fail the listing once this many pages have been served.
    pub fail_list_after_pages: Mutex<Option<usize>>,
    pages_served: AtomicUsize,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            bucket_created: AtomicBool::new(false),
            objects: Mutex::new(BTreeMap::new()),
            page_size: 1000,
            create_calls: AtomicUsize::new(0),
            fail_bucket_check: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            fail_presign: AtomicBool::new(false),
            fail_list_after_pages: Mutex::new(None),
            pages_served: AtomicUsize::new(0),
        }
    }

    /// A store whose bucket already exists.
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::new(bucket);
        store.bucket_created.store(true, Ordering::SeqCst);
        store
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Place an object directly, as another writer would.
    pub fn insert_raw(&self, key: &str, body: &[u8], last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                body: Bytes::copy_from_slice(body),
                metadata: None,
                last_modified,
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredBlob> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn unavailable(operation: &'static str) -> StoreError {
        StoreError::UnexpectedStatus {
            operation,
            status: 503,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        if self.fail_bucket_check.load(Ordering::SeqCst) {
            return Err(Self::unavailable("bucket exists"));
        }
        Ok(self.bucket_created.load(Ordering::SeqCst))
    }

    async fn create_bucket(&self) -> StoreResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.bucket_created.swap(true, Ordering::SeqCst) {
            return Err(StoreError::UnexpectedStatus {
                operation: "create bucket",
                status: 409,
            });
        }
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        metadata: &UploadMetadata,
    ) -> StoreResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) || !self.bucket_created.load(Ordering::SeqCst) {
            return Err(Self::unavailable("put object"));
        }
        // Yield so concurrent uploads interleave.
        tokio::task::yield_now().await;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                body,
                metadata: Some(metadata.clone()),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list_page(&self, continuation_token: Option<String>) -> StoreResult<ObjectPage> {
        let served = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_list_after_pages.lock().unwrap() {
            if served >= limit {
                return Err(Self::unavailable("list objects"));
            }
        }

        let objects = self.objects.lock().unwrap();
        let mut page: Vec<ObjectSummary> = objects
            .iter()
            .filter(|(key, _)| {
                continuation_token
                    .as_deref()
                    .is_none_or(|token| key.as_str() > token)
            })
            .take(self.page_size + 1)
            .map(|(key, blob)| ObjectSummary {
                key: key.clone(),
                size: blob.body.len() as u64,
                last_modified: Some(blob.last_modified),
            })
            .collect();

        let next_continuation_token = if page.len() > self.page_size {
            page.pop();
            page.last().map(|last| last.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects: page,
            next_continuation_token,
        })
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> StoreResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(Self::unavailable("presign get"));
        }
        let issued = Utc::now().format("%Y%m%dT%H%M%S%.9fZ");
        Ok(format!(
            "http://memory.local/{}/{}?X-Amz-Date={}&X-Amz-Expires={}",
            self.bucket, key, issued, expiry_secs
        ))
    }
}
