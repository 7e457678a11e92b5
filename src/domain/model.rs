use chrono::{DateTime, Utc};
use crate::utils::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend a storage location is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocationAdapterKind {
    Local,
    S3,
}

impl StorageLocationAdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocationAdapterKind::Local => "local",
            StorageLocationAdapterKind::S3 => "s3",
        }
    }
}

impl fmt::Display for StorageLocationAdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a storage location is used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocationType {
    #[default]
    Backup,
    StationMedia,
    StationRecordings,
    StationPodcasts,
}

impl StorageLocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocationType::Backup => "backup",
            StorageLocationType::StationMedia => "station_media",
            StorageLocationType::StationRecordings => "station_recordings",
            StorageLocationType::StationPodcasts => "station_podcasts",
        }
    }
}

impl fmt::Display for StorageLocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLocationType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backup" => Ok(StorageLocationType::Backup),
            "station_media" => Ok(StorageLocationType::StationMedia),
            "station_recordings" => Ok(StorageLocationType::StationRecordings),
            "station_podcasts" => Ok(StorageLocationType::StationPodcasts),
            other => Err(StorageError::InvalidConfigValueError {
                field: "type".to_string(),
                value: other.to_string(),
                reason: "Expected backup, station_media, station_recordings or station_podcasts"
                    .to_string(),
            }),
        }
    }
}

/// S3 connection settings. Every field is optional so that an incomplete
/// location can still be loaded and reported on.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    pub s3_bucket: Option<String>,
    pub s3_credential_key: Option<String>,
    #[serde(skip_serializing)]
    pub s3_credential_secret: Option<String>,
    pub s3_region: Option<String>,
    pub s3_version: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_use_path_style: Option<bool>,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_credential_key", &self.s3_credential_key)
            .field(
                "s3_credential_secret",
                &self.s3_credential_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("s3_region", &self.s3_region)
            .field("s3_version", &self.s3_version)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("s3_use_path_style", &self.s3_use_path_style)
            .finish()
    }
}

/// Per-backend payload, selected by the `adapter` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "adapter", rename_all = "lowercase")]
pub enum AdapterSettings {
    Local,
    S3(S3Settings),
}

impl AdapterSettings {
    pub fn kind(&self) -> StorageLocationAdapterKind {
        match self {
            AdapterSettings::Local => StorageLocationAdapterKind::Local,
            AdapterSettings::S3(_) => StorageLocationAdapterKind::S3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: String,
    #[serde(rename = "type", default)]
    pub location_type: StorageLocationType,
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub adapter: AdapterSettings,
}

impl StorageLocation {
    pub fn local(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location_type: StorageLocationType::default(),
            path: path.into(),
            adapter: AdapterSettings::Local,
        }
    }

    pub fn s3(id: impl Into<String>, path: impl Into<String>, settings: S3Settings) -> Self {
        Self {
            id: id.into(),
            location_type: StorageLocationType::default(),
            path: path.into(),
            adapter: AdapterSettings::S3(settings),
        }
    }

    pub fn with_type(mut self, location_type: StorageLocationType) -> Self {
        self.location_type = location_type;
        self
    }

    pub fn kind(&self) -> StorageLocationAdapterKind {
        self.adapter.kind()
    }

    pub fn s3_settings(&self) -> Option<&S3Settings> {
        match &self.adapter {
            AdapterSettings::S3(settings) => Some(settings),
            AdapterSettings::Local => None,
        }
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_settings()
            .and_then(|settings| settings.s3_bucket.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry returned by a storage adapter, with its path relative to the
/// adapter root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAttributes {
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileAttributes {
    pub fn file(
        path: impl Into<String>,
        size: Option<u64>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
            last_modified,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: None,
            last_modified: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Object as reported by the object storage client, keyed by its full key.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
}
