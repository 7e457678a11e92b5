use crate::domain::model::S3Settings;
use serde_json::{json, Map, Value};
use std::fmt;

/// Request checksums are only computed for operations that require them.
pub const REQUEST_CHECKSUM_CALCULATION: &str = "when_required";

#[derive(Clone, PartialEq)]
pub struct S3Credentials {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Client options assembled from a location's S3 settings. Unset and empty
/// fields are left out so the client falls back to its own defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct S3ClientOptions {
    pub credentials: Option<S3Credentials>,
    pub region: Option<String>,
    pub version: Option<String>,
    pub endpoint: Option<String>,
    pub use_path_style_endpoint: bool,
    pub request_checksum_calculation: &'static str,
    /// Canned ACL applied to uploads; empty means none is sent.
    pub default_acl: String,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl S3ClientOptions {
    pub fn from_settings(settings: &S3Settings) -> Self {
        let credentials = match (
            present(&settings.s3_credential_key),
            present(&settings.s3_credential_secret),
        ) {
            (Some(key), Some(secret)) => Some(S3Credentials { key, secret }),
            (None, None) => None,
            (key, _) => {
                tracing::warn!(
                    "⚠️ Only the S3 credential {} is set; falling back to the default AWS credential chain",
                    if key.is_some() { "key" } else { "secret" }
                );
                None
            }
        };

        Self {
            credentials,
            region: present(&settings.s3_region),
            version: present(&settings.s3_version),
            endpoint: present(&settings.s3_endpoint),
            use_path_style_endpoint: settings.s3_use_path_style.unwrap_or(false),
            request_checksum_calculation: REQUEST_CHECKSUM_CALCULATION,
            default_acl: String::new(),
        }
    }

    /// Flat view of the options as handed to the client. Keys whose source
    /// is unset are absent rather than empty.
    pub fn to_option_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        if let Some(credentials) = &self.credentials {
            map.insert(
                "credentials".to_string(),
                json!({ "key": credentials.key, "secret": credentials.secret }),
            );
        }
        if let Some(region) = &self.region {
            map.insert("region".to_string(), Value::String(region.clone()));
        }
        if let Some(version) = &self.version {
            map.insert("version".to_string(), Value::String(version.clone()));
        }
        if let Some(endpoint) = &self.endpoint {
            map.insert("endpoint".to_string(), Value::String(endpoint.clone()));
        }
        if self.use_path_style_endpoint {
            map.insert("use_path_style_endpoint".to_string(), Value::Bool(true));
        }
        map.insert(
            "request_checksum_calculation".to_string(),
            Value::String(self.request_checksum_calculation.to_string()),
        );
        map.insert("options".to_string(), json!({ "ACL": self.default_acl }));

        map
    }
}
