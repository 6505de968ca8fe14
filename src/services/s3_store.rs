//! [`ObjectStore`] over an S3-compatible endpoint (MinIO, AWS S3, R2, ...).

use crate::{
    config::StoreConfig,
    models::object::{ObjectPage, ObjectSummary},
    services::object_store::{
        ObjectStore, StoreResult, UploadMetadata, bucket_presence, ensure_success,
    },
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use s3::{Bucket, BucketConfiguration, Region, creds::Credentials};
use tracing::{debug, warn};

/// Region used for signing and for bucket creation.
const DEFAULT_REGION: &str = "us-east-1";

/// User metadata header carrying the uploader's filename.
pub const ORIGINAL_NAME_HEADER: &str = "x-amz-meta-original-name";

pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl S3ObjectStore {
    /// Build a path-style client for the configured bucket.
    ///
    /// No request is made here; connectivity problems surface on first use.
    pub fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let region = Region::Custom {
            region: DEFAULT_REGION.to_string(),
            endpoint: config.endpoint_url(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )?;

        let bucket =
            Bucket::new(&config.bucket, region.clone(), credentials.clone())?.with_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        // GetBucketLocation only needs rights on this bucket, unlike ListBuckets.
        let (_region, status) = self.bucket.location().await?;
        bucket_presence("bucket exists", status)
    }

    async fn create_bucket(&self) -> StoreResult<()> {
        let response = Bucket::create_with_path_style(
            &self.bucket.name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await?;
        ensure_success("create bucket", response.response_code)
    }

    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        metadata: &UploadMetadata,
    ) -> StoreResult<()> {
        // Header values must be visible ASCII, filenames are arbitrary UTF-8.
        let encoded_name =
            utf8_percent_encode(&metadata.original_name, NON_ALPHANUMERIC).to_string();
        let mut bucket = self.bucket.clone();
        bucket.add_header(ORIGINAL_NAME_HEADER, &encoded_name);

        let response = bucket
            .put_object_with_content_type(key, &body, &metadata.content_type)
            .await?;
        ensure_success("put object", response.status_code())?;
        debug!(key, size = body.len(), "stored object");
        Ok(())
    }

    async fn list_page(&self, continuation_token: Option<String>) -> StoreResult<ObjectPage> {
        let (result, status) = self
            .bucket
            .list_page(String::new(), None, continuation_token, None, None)
            .await?;
        ensure_success("list objects", status)?;

        let objects = result
            .contents
            .into_iter()
            .map(|object| ObjectSummary {
                last_modified: parse_last_modified(&object.key, &object.last_modified),
                key: object.key,
                size: object.size,
            })
            .collect();

        let next_continuation_token = if result.is_truncated {
            result.next_continuation_token
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> StoreResult<String> {
        Ok(self.bucket.presign_get(key, expiry_secs, None).await?)
    }
}

fn parse_last_modified(key: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(err) => {
            warn!(key, raw, "unparsable last-modified from store: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StoreConfig {
        StoreConfig {
            endpoint: "localhost".into(),
            port: 9000,
            use_ssl: false,
            access_key: "minioadmin".into(),
            secret_key: "s3cr3t-value".into(),
            bucket: "uploads".into(),
        }
    }

    #[test]
    fn parses_store_timestamps() {
        let parsed = parse_last_modified("k", "2025-02-03T04:05:06.000Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-02-03T04:05:06+00:00");
        assert!(parse_last_modified("k", "yesterday").is_none());
    }

    #[test]
    fn connect_targets_configured_bucket() {
        let store = S3ObjectStore::connect(&config()).unwrap();
        assert_eq!(store.bucket_name(), "uploads");
    }

    #[tokio::test]
    async fn presigned_urls_are_path_style_and_scoped_to_key() {
        let store = S3ObjectStore::connect(&config()).unwrap();
        let url = store.presign_get("abc-123", 86_400).await.unwrap();

        assert!(url.starts_with("http://localhost:9000/uploads/abc-123?"));
        assert!(url.contains("X-Amz-Expires=86400"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(!url.contains("s3cr3t-value"));
    }
}
