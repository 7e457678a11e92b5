use crate::domain::model::{StorageLocation, StorageLocationAdapterKind, StorageLocationType};
use crate::utils::error::StorageError;
use std::time::{Duration, Instant};

/// Outcome of validating a single storage location.
#[derive(Debug)]
pub struct LocationReport {
    pub id: String,
    pub kind: StorageLocationAdapterKind,
    pub location_type: StorageLocationType,
    pub uri: String,
    pub elapsed: Duration,
    pub result: Result<(), StorageError>,
}

impl LocationReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub reports: Vec<LocationReport>,
}

impl ValidationSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &LocationReport> {
        self.reports.iter().filter(|r| !r.is_ok())
    }

    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(LocationReport::is_ok)
    }
}

/// Runs the two-step validation for a set of locations, one at a time.
pub struct LocationValidator<'a> {
    locations: Vec<&'a StorageLocation>,
}

impl<'a> LocationValidator<'a> {
    pub fn new(locations: impl IntoIterator<Item = &'a StorageLocation>) -> Self {
        Self {
            locations: locations.into_iter().collect(),
        }
    }

    pub async fn validate_one(location: &StorageLocation) -> LocationReport {
        let started = Instant::now();
        let uri = location.uri(None);

        tracing::info!(
            "🔍 Validating {} storage location {} [{}] ({})",
            location.location_type,
            location.id,
            location.kind(),
            uri
        );

        let result = match location.adapter() {
            Ok(adapter) => adapter.validate().await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => tracing::info!("✅ Storage location {} is valid", location.id),
            Err(e) => tracing::error!(
                "❌ Storage location {} failed validation: {} (Category: {:?})",
                location.id,
                e,
                e.category()
            ),
        }

        LocationReport {
            id: location.id.clone(),
            kind: location.kind(),
            location_type: location.location_type,
            uri,
            elapsed: started.elapsed(),
            result,
        }
    }

    pub async fn run(&self) -> ValidationSummary {
        let mut summary = ValidationSummary::default();

        for location in &self.locations {
            summary.reports.push(Self::validate_one(location).await);
        }

        tracing::info!(
            "Validated {} storage locations: {} passed",
            summary.reports.len(),
            summary.passed()
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::S3Settings;

    #[tokio::test]
    async fn test_summary_collects_each_location() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = StorageLocation::local("good", dir.path().to_str().unwrap())
            .with_type(StorageLocationType::StationMedia);
        let missing = StorageLocation::local("missing", "/no/such/storage/root");
        let no_bucket = StorageLocation::s3("no-bucket", "x", S3Settings::default());

        let summary = LocationValidator::new([&good, &missing, &no_bucket])
            .run()
            .await;

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.passed(), 1);
        assert!(!summary.all_passed());

        assert_eq!(summary.reports[0].kind, StorageLocationAdapterKind::Local);
        assert_eq!(
            summary.reports[0].location_type,
            StorageLocationType::StationMedia
        );
        assert_eq!(summary.reports[2].kind, StorageLocationAdapterKind::S3);
        assert_eq!(summary.reports[2].location_type, StorageLocationType::Backup);

        let failed: Vec<&str> = summary.failed().map(|r| r.id.as_str()).collect();
        assert_eq!(failed, vec!["missing", "no-bucket"]);
        assert!(matches!(
            summary.reports[2].result,
            Err(StorageError::ConfigError { .. })
        ));
    }
}
