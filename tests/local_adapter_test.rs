use anyhow::Result;
use storage_locations::{
    LocationValidator, LocationsConfig, StorageError, StorageLocation, StorageLocationAdapterKind,
};
use tempfile::TempDir;

fn local_location(dir: &TempDir) -> StorageLocation {
    let path = format!("{}/", dir.path().to_str().unwrap());
    StorageLocation::local("media", path)
}

#[tokio::test]
async fn test_local_storage_adapter_file_operations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let adapter = local_location(&temp_dir).adapter()?;
    assert_eq!(adapter.kind(), StorageLocationAdapterKind::Local);

    let storage = adapter.storage_adapter().await?;

    storage.write("albums/one/track.mp3", b"ID3").await?;
    storage.write("/cover.jpg", b"JPEG").await?;

    assert!(storage.file_exists("albums/one/track.mp3").await?);
    assert!(!storage.file_exists("albums/one").await?);
    assert_eq!(storage.read("cover.jpg").await?, b"JPEG");
    assert!(temp_dir.path().join("albums/one/track.mp3").exists());

    let metadata = storage.metadata("albums/one/track.mp3").await?;
    assert_eq!(metadata.size, Some(3));
    assert!(metadata.last_modified.is_some());

    let shallow: Vec<String> = storage
        .list_contents("", false)
        .await?
        .into_iter()
        .map(|entry| entry.path)
        .collect();
    assert_eq!(shallow, vec!["albums".to_string(), "cover.jpg".to_string()]);

    let deep = storage.list_contents("/", true).await?;
    let files: Vec<&str> = deep
        .iter()
        .filter(|entry| entry.is_file())
        .map(|entry| entry.path.as_str())
        .collect();
    assert_eq!(files, vec!["albums/one/track.mp3", "cover.jpg"]);

    storage.delete("cover.jpg").await?;
    storage.delete("cover.jpg").await?;
    assert!(matches!(
        storage.read("cover.jpg").await,
        Err(StorageError::NotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_local_validation_requires_existing_directory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let adapter = local_location(&temp_dir).adapter()?;
    adapter.validate().await?;

    let missing = StorageLocation::local("missing", temp_dir.path().join("nope").to_str().unwrap());
    let result = missing.adapter()?.validate().await;
    assert!(matches!(result, Err(StorageError::ValidationError { .. })));

    Ok(())
}

#[tokio::test]
async fn test_validator_over_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let config = LocationsConfig::from_toml_str(&format!(
        r#"
[[locations]]
id = "media"
type = "station_media"
adapter = "local"
path = "{root}"

[[locations]]
id = "recordings"
type = "station_recordings"
adapter = "local"
path = "{root}/recordings"

[[locations]]
id = "backups"
adapter = "s3"
path = "backups"
"#
    ))?;

    let summary = LocationValidator::new(&config.locations).run().await;

    assert_eq!(summary.passed(), 1);
    let failed: Vec<&str> = summary.failed().map(|r| r.id.as_str()).collect();
    assert_eq!(failed, vec!["recordings", "backups"]);
    assert_eq!(summary.reports[2].uri, "s3:///backups");

    Ok(())
}
