pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    AwsS3Adapter, LocalFilesystemAdapter, LocalStorageLocationAdapter, S3StorageLocationAdapter,
};
pub use config::LocationsConfig;
pub use core::validator::{LocationReport, LocationValidator, ValidationSummary};
pub use domain::model::{
    AdapterSettings, FileAttributes, S3Settings, StorageLocation, StorageLocationAdapterKind,
    StorageLocationType,
};
pub use domain::ports::{ObjectClient, StorageAdapter, StorageLocationAdapter};
pub use utils::error::{Result, StorageError};
