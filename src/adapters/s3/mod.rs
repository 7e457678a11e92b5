pub mod client;
pub mod filesystem;
pub mod options;

pub use client::{S3ClientFactory, SdkClientFactory, SdkObjectClient};
pub use filesystem::AwsS3Adapter;
pub use options::{S3ClientOptions, S3Credentials};

use crate::core::path::{apply_path, trim_slashes};
use crate::domain::model::{S3Settings, StorageLocation, StorageLocationAdapterKind};
use crate::domain::ports::{ObjectClient, StorageAdapter, StorageLocationAdapter};
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage location adapter for S3 and S3-compatible object stores.
///
/// Every call that needs a client builds a new one through the factory;
/// clients are never reused between calls.
#[derive(Debug, Clone)]
pub struct S3StorageLocationAdapter<F: S3ClientFactory = SdkClientFactory> {
    location: StorageLocation,
    settings: S3Settings,
    factory: F,
}

impl S3StorageLocationAdapter<SdkClientFactory> {
    pub fn new(location: StorageLocation) -> Result<Self> {
        Self::with_factory(location, SdkClientFactory)
    }
}

impl<F: S3ClientFactory> S3StorageLocationAdapter<F> {
    pub fn with_factory(location: StorageLocation, factory: F) -> Result<Self> {
        let settings = location.s3_settings().cloned().ok_or_else(|| {
            StorageError::config(format!(
                "Storage location '{}' uses the {} adapter, not s3",
                location.id,
                location.kind()
            ))
        })?;

        Ok(Self {
            location,
            settings,
            factory,
        })
    }

    /// Strips leading and trailing slashes from a bucket prefix.
    pub fn filter_path(path: &str) -> String {
        trim_slashes(path).to_string()
    }

    /// `s3://<bucket>/<path>[/<suffix>]`, with leading slashes removed from
    /// the path part.
    pub fn uri_for(location: &StorageLocation, suffix: Option<&str>) -> String {
        let path = apply_path(&location.path, suffix);
        format!(
            "s3://{}/{}",
            location.s3_bucket().unwrap_or_default(),
            path.trim_start_matches('/')
        )
    }

    pub fn client_options(&self) -> S3ClientOptions {
        S3ClientOptions::from_settings(&self.settings)
    }

    fn bucket(&self) -> Result<&str> {
        self.settings
            .s3_bucket
            .as_deref()
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| StorageError::config("Amazon S3 bucket is empty."))
    }

    async fn client(&self) -> Result<Arc<dyn ObjectClient>> {
        self.factory.create_client(&self.client_options()).await
    }
}

#[async_trait]
impl<F: S3ClientFactory> StorageLocationAdapter for S3StorageLocationAdapter<F> {
    fn kind(&self) -> StorageLocationAdapterKind {
        StorageLocationAdapterKind::S3
    }

    fn filtered_path(&self) -> String {
        Self::filter_path(&self.location.path)
    }

    fn uri(&self, suffix: Option<&str>) -> String {
        Self::uri_for(&self.location, suffix)
    }

    async fn storage_adapter(&self) -> Result<Box<dyn StorageAdapter>> {
        let filtered_path = self.filtered_path();
        // bucket 缺少時不建立 client
        let bucket = self.bucket()?.to_string();

        // 每次都建立新的 client
        let options = self.client_options();
        let client = self.factory.create_client(&options).await?;

        Ok(Box::new(
            AwsS3Adapter::new(client, bucket, filtered_path).with_default_acl(options.default_acl),
        ))
    }

    async fn check_backend(&self) -> Result<()> {
        let bucket = self.bucket()?;
        let client = self.client().await?;

        // 只列出一個物件，用來確認憑證與 bucket 設定
        client.list_objects(bucket, None, None, Some(1)).await?;

        tracing::debug!(
            "S3 bucket {} is reachable for storage location {}",
            bucket,
            self.location.id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str, bucket: Option<&str>) -> StorageLocation {
        StorageLocation::s3(
            "backups",
            path,
            S3Settings {
                s3_bucket: bucket.map(str::to_string),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_kind_is_s3() {
        let adapter = S3StorageLocationAdapter::new(location("x", Some("b"))).unwrap();
        assert_eq!(adapter.kind(), StorageLocationAdapterKind::S3);
    }

    #[test]
    fn test_filter_path() {
        assert_eq!(S3StorageLocationAdapter::<SdkClientFactory>::filter_path("/a/b/"), "a/b");
        assert_eq!(S3StorageLocationAdapter::<SdkClientFactory>::filter_path(""), "");
        assert_eq!(S3StorageLocationAdapter::<SdkClientFactory>::filter_path("///"), "");
    }

    #[test]
    fn test_uri() {
        let loc = location("x", Some("b"));
        assert_eq!(S3StorageLocationAdapter::<SdkClientFactory>::uri_for(&loc, None), "s3://b/x");
        assert_eq!(
            S3StorageLocationAdapter::<SdkClientFactory>::uri_for(&loc, Some("/2024/db.zip")),
            "s3://b/x/2024/db.zip"
        );

        let rooted = location("/radio/", Some("b"));
        assert_eq!(
            S3StorageLocationAdapter::<SdkClientFactory>::uri_for(&rooted, None),
            "s3://b/radio/"
        );
    }

    #[test]
    fn test_local_location_is_rejected() {
        let result = S3StorageLocationAdapter::new(StorageLocation::local("media", "/srv"));
        assert!(matches!(result, Err(StorageError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_bucket_fails_before_client_is_built() {
        for bucket in [None, Some("")] {
            let adapter = S3StorageLocationAdapter::new(location("x", bucket)).unwrap();
            match tokio_test::block_on(adapter.storage_adapter()) {
                Err(err) => assert_eq!(
                    err.to_string(),
                    "Configuration error: Amazon S3 bucket is empty."
                ),
                Ok(_) => panic!("expected a configuration error"),
            }
        }
    }
}
