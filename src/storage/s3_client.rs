// S3-compatible bucket client (AWS S3, Cloudflare R2, MinIO)

use anyhow::{anyhow, Result};
use s3::{creds::Credentials, Bucket, Region};
use tracing::debug;

use crate::config::StorageConfig;

pub struct S3Client {
    bucket: Bucket,
}

impl S3Client {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| anyhow!("Invalid S3 region {}: {}", config.region, e))?,
        };

        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)?;
        // Custom endpoints (R2, MinIO) do not serve virtual-hosted buckets
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    pub async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(anyhow!("S3 put of {} failed with status {}", key, status));
        }

        debug!(key, bytes = data.len(), "Stored object");
        Ok(())
    }
}
