use crate::core::path::apply_path;
use crate::domain::model::{FileAttributes, StorageLocation, StorageLocationAdapterKind};
use crate::domain::ports::{StorageAdapter, StorageLocationAdapter};
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorageLocationAdapter {
    location: StorageLocation,
}

impl LocalStorageLocationAdapter {
    pub fn new(location: StorageLocation) -> Self {
        Self { location }
    }

    /// Drops trailing slashes; the filesystem root stays `/`.
    pub fn filter_path(path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() && path.starts_with('/') {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn uri_for(location: &StorageLocation, suffix: Option<&str>) -> String {
        apply_path(&location.path, suffix)
    }
}

#[async_trait]
impl StorageLocationAdapter for LocalStorageLocationAdapter {
    fn kind(&self) -> StorageLocationAdapterKind {
        StorageLocationAdapterKind::Local
    }

    fn filtered_path(&self) -> String {
        Self::filter_path(&self.location.path)
    }

    fn uri(&self, suffix: Option<&str>) -> String {
        Self::uri_for(&self.location, suffix)
    }

    async fn storage_adapter(&self) -> Result<Box<dyn StorageAdapter>> {
        Ok(Box::new(LocalFilesystemAdapter::new(self.filtered_path())))
    }

    async fn check_backend(&self) -> Result<()> {
        let root = self.filtered_path();
        let is_dir = match tokio::fs::metadata(&root).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        if !is_dir {
            return Err(StorageError::ValidationError {
                message: format!("Directory does not exist: {}", root),
            });
        }

        tracing::debug!("Local storage root {} is a directory", root);
        Ok(())
    }
}

/// Storage adapter over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFilesystemAdapter {
    root: PathBuf,
}

impl LocalFilesystemAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        // 不允許跳出根目錄
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StorageError::ValidationError {
                message: format!("Path escapes the storage root: {}", path),
            });
        }
        Ok(self.root.join(relative))
    }

    fn attributes(relative: String, metadata: &std::fs::Metadata) -> FileAttributes {
        if metadata.is_dir() {
            return FileAttributes::directory(relative);
        }
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        FileAttributes::file(relative, Some(metadata.len()), modified)
    }
}

fn not_found(path: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound {
            path: path.to_string(),
        }
    } else {
        StorageError::IoError(e)
    }
}

#[async_trait]
impl StorageAdapter for LocalFilesystemAdapter {
    async fn file_exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| not_found(path, e))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;

        // 確保上層目錄存在
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_contents(&self, path: &str, deep: bool) -> Result<Vec<FileAttributes>> {
        let base = path.trim_matches('/').to_string();
        let start = self.full_path(&base)?;

        let mut entries = Vec::new();
        // 以堆疊走訪目錄，deep 時才加入子目錄
        let mut pending = vec![(start, base)];

        while let Some((dir, relative_dir)) = pending.pop() {
            let mut read_dir = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| not_found(&relative_dir, e))?;

            while let Some(entry) = read_dir.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let relative = if relative_dir.is_empty() {
                    name
                } else {
                    format!("{}/{}", relative_dir, name)
                };

                let metadata = entry.metadata().await?;
                if deep && metadata.is_dir() {
                    pending.push((entry.path(), relative.clone()));
                }
                entries.push(Self::attributes(relative, &metadata));
            }
        }

        // 依路徑排序，輸出順序固定
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn metadata(&self, path: &str) -> Result<FileAttributes> {
        let full_path = self.full_path(path)?;
        let metadata = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| not_found(path, e))?;
        Ok(Self::attributes(
            path.trim_matches('/').to_string(),
            &metadata,
        ))
    }
}
