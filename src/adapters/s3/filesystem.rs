use crate::core::path::join_key;
use crate::domain::model::FileAttributes;
use crate::domain::ports::{ObjectClient, StorageAdapter};
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage adapter over one bucket, rooted at `prefix`.
#[derive(Clone)]
pub struct AwsS3Adapter {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    prefix: String,
    default_acl: String,
}

impl std::fmt::Debug for AwsS3Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsS3Adapter")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("default_acl", &self.default_acl)
            .finish()
    }
}

impl AwsS3Adapter {
    pub fn new(client: Arc<dyn ObjectClient>, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
            default_acl: String::new(),
        }
    }

    pub fn with_default_acl(mut self, acl: impl Into<String>) -> Self {
        self.default_acl = acl.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn object_key(&self, path: &str) -> String {
        join_key(&self.prefix, path)
    }

    /// Key prefix used to list a directory: always ends in `/` unless it is
    /// the bucket root.
    fn directory_prefix(&self, path: &str) -> String {
        let key = self.object_key(path.trim_end_matches('/'));
        if key.is_empty() {
            key
        } else {
            format!("{}/", key)
        }
    }

    fn relative_path(&self, key: &str) -> String {
        let relative = if self.prefix.is_empty() {
            key
        } else {
            match key.strip_prefix(self.prefix.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    rest.trim_start_matches('/')
                }
                _ => key,
            }
        };
        relative.trim_end_matches('/').to_string()
    }
}

#[async_trait]
impl StorageAdapter for AwsS3Adapter {
    async fn file_exists(&self, path: &str) -> Result<bool> {
        let key = self.object_key(path);
        Ok(self.client.head_object(&self.bucket, &key).await?.is_some())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let key = self.object_key(path);
        self.client
            .get_object(&self.bucket, &key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { .. } => StorageError::NotFound {
                    path: path.to_string(),
                },
                other => other,
            })
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let key = self.object_key(path);
        let acl = Some(self.default_acl.as_str()).filter(|acl| !acl.is_empty());

        self.client
            .put_object(&self.bucket, &key, data.to_vec(), acl)
            .await?;
        tracing::debug!("Uploaded {} bytes to s3://{}/{}", data.len(), self.bucket, key);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let key = self.object_key(path);
        self.client.delete_object(&self.bucket, &key).await
    }

    async fn list_contents(&self, path: &str, deep: bool) -> Result<Vec<FileAttributes>> {
        let prefix = self.directory_prefix(path);
        // 非遞迴時以 "/" 分隔，子目錄會以 common prefix 回傳
        let delimiter = if deep { None } else { Some("/") };

        let listing = self
            .client
            .list_objects(
                &self.bucket,
                Some(prefix.as_str()).filter(|p| !p.is_empty()),
                delimiter,
                None,
            )
            .await?;

        let mut entries = Vec::with_capacity(listing.objects.len() + listing.common_prefixes.len());

        for object in listing.objects {
            // 目錄佔位物件
            if object.key.ends_with('/') {
                if object.key != prefix {
                    entries.push(FileAttributes::directory(self.relative_path(&object.key)));
                }
                continue;
            }
            entries.push(FileAttributes::file(
                self.relative_path(&object.key),
                object.size,
                object.last_modified,
            ));
        }
        // 子目錄
        for common_prefix in listing.common_prefixes {
            entries.push(FileAttributes::directory(self.relative_path(&common_prefix)));
        }

        // 排序並移除佔位物件與 common prefix 的重複項目
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Ok(entries)
    }

    async fn metadata(&self, path: &str) -> Result<FileAttributes> {
        let key = self.object_key(path);
        match self.client.head_object(&self.bucket, &key).await? {
            Some(object) => Ok(FileAttributes::file(
                self.relative_path(&object.key),
                object.size,
                object.last_modified,
            )),
            None => Err(StorageError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}
