//! S3-compatible object store.

use std::time::Instant;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::{debug, info};

use homepage_core::{Error, ObjectAcl, ObjectStore, PutOptions, Result};

use crate::config::S3Config;
use crate::public_url::PublicUrls;

/// Object store backed by an S3 bucket.
///
/// The client is built once and shared; it is safe to use from concurrent
/// requests.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    urls: PublicUrls,
}

impl S3ObjectStore {
    /// Build a client from configuration. Static credentials are used when
    /// configured, otherwise the default AWS provider chain.
    pub async fn connect(config: &S3Config) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(Error::Config("S3 bucket name is empty".to_string()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "homepage-static",
            ));
        }
        let sdk_config = loader.load().await;

        let timeouts = TimeoutConfig::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .operation_timeout(config.operation_timeout)
            .build();

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .timeout_config(timeouts);
        if let Some(endpoint) = config.endpoint.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }

        info!(
            subsystem = "storage",
            component = "s3",
            op = "connect",
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            cdn = config.cdn_domain.as_deref().unwrap_or("none"),
            connect_timeout_secs = config.connect_timeout.as_secs(),
            operation_timeout_secs = config.operation_timeout.as_secs(),
            "S3 object store configured"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            urls: PublicUrls::for_s3(config),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::Private => ObjectCannedAcl::Private,
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> Result<()> {
        let start = Instant::now();
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(&options.content_type)
            .cache_control(&options.cache_control)
            .acl(canned_acl(options.acl))
            .send()
            .await
            .map_err(|e| {
                Error::UploadFailed(format!(
                    "put s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(
            subsystem = "storage",
            component = "s3",
            op = "put",
            storage_key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Object stored"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let start = Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "delete s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(
            subsystem = "storage",
            component = "s3",
            op = "delete",
            storage_key = %key,
            duration_ms = start.elapsed().as_millis() as u64,
            "Object deleted"
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_acl_mapping() {
        assert_eq!(canned_acl(ObjectAcl::PublicRead), ObjectCannedAcl::PublicRead);
        assert_eq!(canned_acl(ObjectAcl::Private), ObjectCannedAcl::Private);
    }

    #[tokio::test]
    async fn test_connect_without_network() {
        // Building the client performs no requests
        let config = S3Config::new("media-bucket", "eu-west-1")
            .with_endpoint("http://127.0.0.1:9")
            .with_credentials("AKIDEXAMPLE", "secret");
        let store = S3ObjectStore::connect(&config).await.unwrap();
        assert_eq!(store.bucket(), "media-bucket");
        assert_eq!(
            store.public_url("production/home/hero/h-00112233.jpg"),
            "http://127.0.0.1:9/media-bucket/production/home/hero/h-00112233.jpg"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_bucket() {
        let err = S3ObjectStore::connect(&S3Config::new(" ", "us-east-1"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
