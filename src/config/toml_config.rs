use crate::domain::model::{AdapterSettings, StorageLocation, StorageLocationType};
use crate::utils::error::{Result, StorageError};
use crate::utils::validation::{
    validate_aws_region, validate_non_empty_string, validate_path, validate_s3_bucket_name,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsConfig {
    #[serde(default)]
    pub locations: Vec<StorageLocation>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

fn toml_parse_error(e: toml::de::Error) -> StorageError {
    StorageError::ConfigValidationError {
        field: "toml_parsing".to_string(),
        message: format!("TOML parsing error: {}", e),
    }
}

impl LocationsConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 先解析 TOML，再於字串值中替換環境變數，變數內容不會被當成 TOML 解讀
        let mut table: toml::Table = toml::from_str(content).map_err(toml_parse_error)?;
        for (_, value) in table.iter_mut() {
            Self::substitute_env_vars(value);
        }

        table.try_into().map_err(toml_parse_error)
    }

    /// 替換字串值中的環境變數 (例如 ${S3_SECRET})，未設定的變數保持原樣
    fn substitute_env_vars(value: &mut toml::Value) {
        match value {
            toml::Value::String(text) => {
                if env_var_pattern().is_match(text.as_str()) {
                    *text = env_var_pattern()
                        .replace_all(text.as_str(), |caps: &regex::Captures| {
                            let var_name = &caps[1];
                            std::env::var(var_name)
                                .unwrap_or_else(|_| format!("${{{}}}", var_name))
                        })
                        .into_owned();
                }
            }
            toml::Value::Array(items) => items.iter_mut().for_each(Self::substitute_env_vars),
            toml::Value::Table(table) => {
                for (_, item) in table.iter_mut() {
                    Self::substitute_env_vars(item);
                }
            }
            _ => {}
        }
    }

    /// 依用途篩選儲存位置，未指定時回傳全部
    pub fn locations_of_type(
        &self,
        location_type: Option<StorageLocationType>,
    ) -> impl Iterator<Item = &StorageLocation> {
        self.locations
            .iter()
            .filter(move |location| location_type.map_or(true, |t| location.location_type == t))
    }

    pub fn find(&self, id: &str) -> Result<&StorageLocation> {
        self.locations
            .iter()
            .find(|location| location.id == id)
            .ok_or_else(|| StorageError::config(format!("Unknown storage location: {}", id)))
    }
}

impl Validate for StorageLocation {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("id", &self.id)?;
        validate_path(&format!("{}.path", self.id), &self.path)?;

        if let AdapterSettings::S3(settings) = &self.adapter {
            let field = |name: &str| format!("{}.{}", self.id, name);

            // bucket 缺少時留給 adapter 回報，這裡只檢查格式
            if let Some(bucket) = settings.s3_bucket.as_deref().filter(|b| !b.is_empty()) {
                validate_s3_bucket_name(&field("s3_bucket"), bucket)?;
            }
            if let Some(region) = settings.s3_region.as_deref().filter(|r| !r.is_empty()) {
                validate_aws_region(&field("s3_region"), region)?;
            }
            if let Some(endpoint) = settings.s3_endpoint.as_deref().filter(|e| !e.is_empty()) {
                validate_url(&field("s3_endpoint"), endpoint)?;
            }
        }

        Ok(())
    }
}

impl Validate for LocationsConfig {
    fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(StorageError::ConfigValidationError {
                field: "locations".to_string(),
                message: "At least one storage location must be configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            location.validate()?;

            if !seen.insert(location.id.as_str()) {
                return Err(StorageError::InvalidConfigValueError {
                    field: "locations.id".to_string(),
                    value: location.id.clone(),
                    reason: "Storage location ids must be unique".to_string(),
                });
            }
        }

        tracing::debug!("✅ {} storage locations passed validation", self.locations.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StorageLocationAdapterKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
[[locations]]
id = "media"
type = "station_media"
adapter = "local"
path = "/srv/stations/main/media"

[[locations]]
id = "backups"
type = "backup"
adapter = "s3"
path = "/backups/"
s3_bucket = "radio-backups"
s3_region = "eu-west-1"
s3_credential_key = "AKIDEXAMPLE"
s3_credential_secret = "secret"
"#;

    #[test]
    fn test_parse_locations() {
        let config = LocationsConfig::from_toml_str(CONFIG).unwrap();

        assert_eq!(config.locations.len(), 2);
        assert_eq!(config.find("media").unwrap().kind(), StorageLocationAdapterKind::Local);
        assert_eq!(config.find("backups").unwrap().s3_bucket(), Some("radio-backups"));
        assert!(config.find("podcasts").is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_locations_of_type() {
        let config = LocationsConfig::from_toml_str(CONFIG).unwrap();

        let ids = |location_type| {
            config
                .locations_of_type(location_type)
                .map(|location| location.id.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(Some(StorageLocationType::Backup)), vec!["backups"]);
        assert_eq!(ids(Some(StorageLocationType::StationMedia)), vec!["media"]);
        assert!(ids(Some(StorageLocationType::StationPodcasts)).is_empty());
        assert_eq!(ids(None), vec!["media", "backups"]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_STORAGE_S3_SECRET", "from-env");

        let config = LocationsConfig::from_toml_str(
            r#"
[[locations]]
id = "backups"
adapter = "s3"
s3_bucket = "radio-backups"
s3_credential_secret = "${TEST_STORAGE_S3_SECRET}"
s3_endpoint = "${TEST_STORAGE_UNSET_VAR}"
"#,
        )
        .unwrap();

        let settings = config.locations[0].s3_settings().unwrap();
        assert_eq!(settings.s3_credential_secret.as_deref(), Some("from-env"));
        assert_eq!(
            settings.s3_endpoint.as_deref(),
            Some("${TEST_STORAGE_UNSET_VAR}")
        );
    }

    #[test]
    fn test_env_values_are_not_parsed_as_toml() {
        let secret = "abc\"\ns3_bucket = \"evil-bucket";
        std::env::set_var("TEST_STORAGE_QUOTED_SECRET", secret);

        let config = LocationsConfig::from_toml_str(
            r#"
[[locations]]
id = "backups"
adapter = "s3"
s3_credential_key = "AKIDEXAMPLE"
s3_credential_secret = "${TEST_STORAGE_QUOTED_SECRET}"
"#,
        )
        .unwrap();

        let location = &config.locations[0];
        assert_eq!(location.s3_bucket(), None);
        assert_eq!(
            location.s3_settings().unwrap().s3_credential_secret.as_deref(),
            Some(secret)
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let config = LocationsConfig::from_toml_str(
            r#"
[[locations]]
id = "media"
adapter = "local"
path = "/a"

[[locations]]
id = "media"
adapter = "local"
path = "/b"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(StorageError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = LocationsConfig::from_toml_str(
            r#"
[[locations]]
id = "backups"
adapter = "s3"
s3_bucket = "radio-backups"
s3_endpoint = "minio:9000"
"#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_adapter_is_a_parse_error() {
        let result = LocationsConfig::from_toml_str(
            r#"
[[locations]]
id = "remote"
adapter = "dropbox"
"#,
        );
        assert!(matches!(
            result,
            Err(StorageError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = LocationsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.locations.len(), 2);
    }
}
