//! In-memory registry of file metadata.
//!
//! The registry is a cache over the bucket, not a source of truth: it is
//! rebuilt wholesale from a listing at startup and only grows afterwards.
//! Ids are assigned under the write lock, so they stay unique and increasing
//! no matter how many uploads append at once.

use crate::models::file_record::FileRecord;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct FileRegistry {
    records: RwLock<Vec<FileRecord>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next id to `record`, store it, and return the stored copy.
    pub async fn append(&self, mut record: FileRecord) -> FileRecord {
        let mut records = self.records.write().await;
        record.id = records.len() as u64 + 1;
        records.push(record.clone());
        record
    }

    /// Discard the current contents and install `records`, numbered 1..=n in
    /// the given order. Returns how many were installed.
    pub async fn replace(&self, records: Vec<FileRecord>) -> usize {
        let numbered: Vec<FileRecord> = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.id = index as u64 + 1;
                record
            })
            .collect();
        let count = numbered.len();
        *self.records.write().await = numbered;
        count
    }

    /// Copy of every record, in registry order.
    pub async fn snapshot(&self) -> Vec<FileRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
