use crate::domain::model::{FileAttributes, ObjectListing, ObjectSummary, StorageLocationAdapterKind};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Path probed by the common validation step.
pub const VALIDATION_PROBE_PATH: &str = "/test";

/// Filesystem-style operations bound to one backend root. Paths are relative
/// to that root; a leading `/` is ignored.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn file_exists(&self, path: &str) -> Result<bool>;

    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Removing a missing file is not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    async fn list_contents(&self, path: &str, deep: bool) -> Result<Vec<FileAttributes>>;

    async fn metadata(&self, path: &str) -> Result<FileAttributes>;
}

/// Turns a `StorageLocation` into a usable [`StorageAdapter`] and checks
/// that the location is reachable.
#[async_trait]
pub trait StorageLocationAdapter: Send + Sync {
    fn kind(&self) -> StorageLocationAdapterKind;

    /// The location's path normalized for this backend.
    fn filtered_path(&self) -> String;

    fn uri(&self, suffix: Option<&str>) -> String;

    async fn storage_adapter(&self) -> Result<Box<dyn StorageAdapter>>;

    /// Backend-specific reachability check.
    async fn check_backend(&self) -> Result<()> {
        Ok(())
    }

    /// Checks shared by every backend: the adapter can be built and answers
    /// a lookup.
    async fn check_common(&self) -> Result<()> {
        let adapter = self.storage_adapter().await?;
        adapter.file_exists(VALIDATION_PROBE_PATH).await?;
        Ok(())
    }

    async fn validate(&self) -> Result<()> {
        self.check_backend().await?;
        self.check_common().await
    }
}

/// The object storage calls the S3 backend relies on.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Lists keys under `prefix`. With `max_keys` set only the first page is
    /// fetched, otherwise all pages are collected.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ObjectListing>;

    /// `None` when the object does not exist.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectSummary>>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}
