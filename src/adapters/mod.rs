// Adapters layer: concrete storage backends behind the domain ports.

pub mod local;
pub mod s3;

pub use local::{LocalFilesystemAdapter, LocalStorageLocationAdapter};
pub use s3::{AwsS3Adapter, S3StorageLocationAdapter};

use crate::domain::model::{AdapterSettings, StorageLocation};
use crate::domain::ports::StorageLocationAdapter;
use crate::utils::error::Result;

impl StorageLocation {
    /// Location adapter for the configured backend.
    pub fn adapter(&self) -> Result<Box<dyn StorageLocationAdapter>> {
        let adapter: Box<dyn StorageLocationAdapter> = match &self.adapter {
            AdapterSettings::Local => Box::new(LocalStorageLocationAdapter::new(self.clone())),
            AdapterSettings::S3(_) => Box::new(S3StorageLocationAdapter::new(self.clone())?),
        };
        Ok(adapter)
    }

    /// Backend-specific URI of this location, optionally extended by `suffix`.
    pub fn uri(&self, suffix: Option<&str>) -> String {
        match &self.adapter {
            AdapterSettings::Local => LocalStorageLocationAdapter::uri_for(self, suffix),
            AdapterSettings::S3(_) => {
                S3StorageLocationAdapter::<s3::SdkClientFactory>::uri_for(self, suffix)
            }
        }
    }
}
