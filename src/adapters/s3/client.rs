use crate::adapters::s3::options::S3ClientOptions;
use crate::domain::model::{ObjectListing, ObjectSummary};
use crate::domain::ports::ObjectClient;
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::{ByteStream, DateTime as AwsDateTime};
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Builds a new object storage client from assembled options.
#[async_trait]
pub trait S3ClientFactory: Send + Sync {
    async fn create_client(&self, options: &S3ClientOptions) -> Result<Arc<dyn ObjectClient>>;
}

/// Factory producing `aws_sdk_s3` clients. Anything not given in the
/// options comes from the standard AWS environment/profile chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkClientFactory;

impl SdkClientFactory {
    /// Shared AWS config carrying credentials, region and endpoint.
    pub async fn shared_config(&self, options: &S3ClientOptions) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        // 只有 key 與 secret 都有設定時才使用靜態憑證
        if let Some(credentials) = &options.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.key.clone(),
                credentials.secret.clone(),
                None,
                None,
                "storage-location",
            ));
        }
        // 未設定的 region 交給環境變數或 profile 決定
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &options.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        loader.load().await
    }

    pub async fn s3_config(&self, options: &S3ClientOptions) -> aws_sdk_s3::Config {
        let shared_config = self.shared_config(options).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired);

        // MinIO 等相容服務需要 path-style 位址
        if options.use_path_style_endpoint {
            builder = builder.force_path_style(true);
        }

        // The Rust SDK pins the API version itself.
        if let Some(version) = &options.version {
            tracing::debug!("Ignoring S3 API version option: {}", version);
        }

        builder.build()
    }

    pub async fn build_client(&self, options: &S3ClientOptions) -> SdkObjectClient {
        SdkObjectClient::new(S3Client::from_conf(self.s3_config(options).await))
    }
}

#[async_trait]
impl S3ClientFactory for SdkClientFactory {
    async fn create_client(&self, options: &S3ClientOptions) -> Result<Arc<dyn ObjectClient>> {
        Ok(Arc::new(self.build_client(options).await))
    }
}

/// [`ObjectClient`] backed by an `aws_sdk_s3` client.
#[derive(Debug, Clone)]
pub struct SdkObjectClient {
    client: S3Client,
}

impl SdkObjectClient {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &S3Client {
        &self.client
    }
}

fn to_utc(value: Option<&AwsDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

#[async_trait]
impl ObjectClient for SdkObjectClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ObjectListing> {
        let mut listing = ObjectListing::default();
        let mut continuation_token: Option<String> = None;

        // 依 continuation token 逐頁讀取
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_prefix(prefix.map(str::to_string))
                .set_delimiter(delimiter.map(str::to_string))
                .set_max_keys(max_keys)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(StorageError::remote)?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    listing.objects.push(ObjectSummary {
                        key: key.to_string(),
                        size: object.size().map(|size| size.max(0) as u64),
                        last_modified: to_utc(object.last_modified()),
                    });
                }
            }
            listing.common_prefixes.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string)),
            );

            // 指定 max_keys 時只取第一頁
            if max_keys.is_some() || !output.is_truncated().unwrap_or(false) {
                break;
            }
            match output.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(
            "Listed {} objects and {} prefixes in bucket {}",
            listing.objects.len(),
            listing.common_prefixes.len(),
            bucket
        );
        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectSummary>> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(Some(ObjectSummary {
                key: key.to_string(),
                size: output.content_length().map(|size| size.max(0) as u64),
                last_modified: to_utc(output.last_modified()),
            })),
            Err(err) => {
                // 物件不存在不是錯誤
                if matches!(err.as_service_error(), Some(HeadObjectError::NotFound(_))) {
                    Ok(None)
                } else {
                    Err(StorageError::remote(err))
                }
            }
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                if matches!(err.as_service_error(), Some(GetObjectError::NoSuchKey(_))) {
                    return Err(StorageError::NotFound {
                        path: key.to_string(),
                    });
                }
                return Err(StorageError::remote(err));
            }
        };

        let data = output.body.collect().await.map_err(StorageError::remote)?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        acl: Option<&str>,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_acl(acl.map(ObjectCannedAcl::from))
            .send()
            .await
            .map_err(StorageError::remote)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(StorageError::remote)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::s3::options::S3Credentials;

    fn options(region: Option<&str>) -> S3ClientOptions {
        S3ClientOptions {
            credentials: Some(S3Credentials {
                key: "AKIDEXAMPLE".to_string(),
                secret: "secret".to_string(),
            }),
            region: region.map(str::to_string),
            version: Some("latest".to_string()),
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            use_path_style_endpoint: true,
            request_checksum_calculation: "when_required",
            default_acl: String::new(),
        }
    }

    #[tokio::test]
    async fn test_client_uses_configured_region_and_endpoint() {
        std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
        let factory = SdkClientFactory;
        let options = options(Some("eu-west-1"));

        let shared = factory.shared_config(&options).await;
        assert_eq!(shared.endpoint_url(), Some("http://127.0.0.1:9000"));
        assert!(shared.credentials_provider().is_some());

        let client = factory.build_client(&options).await;
        let config = client.inner().config();
        assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert_eq!(
            config.request_checksum_calculation(),
            Some(&RequestChecksumCalculation::WhenRequired)
        );
    }

    #[tokio::test]
    async fn test_unset_region_comes_from_environment() {
        std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
        std::env::set_var("AWS_REGION", "ap-southeast-2");
        let factory = SdkClientFactory;

        let client = factory.build_client(&options(None)).await;
        assert_eq!(
            client.inner().config().region().map(|r| r.as_ref()),
            Some("ap-southeast-2")
        );

        // explicit region wins over the environment
        let client = factory.build_client(&options(Some("eu-west-1"))).await;
        assert_eq!(
            client.inner().config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_not_set() {
        std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
        let options = S3ClientOptions {
            endpoint: None,
            ..options(Some("eu-west-1"))
        };

        let shared = SdkClientFactory.shared_config(&options).await;
        assert_eq!(shared.endpoint_url(), None);
    }
}
