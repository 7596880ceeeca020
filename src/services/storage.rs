use crate::utils::helpers::random_token;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::env;
use thiserror::Error;
use tracing::info;

/// Bucket holding donation proof captures, keyed per poster.
pub const PROOFS_BUCKET: &str = "proofs";
/// Bucket holding uploaded PDF medical reports.
pub const REPORTS_BUCKET: &str = "reports";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upload rejected with status {status}: {message}")]
    Upload { status: StatusCode, message: String },
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, StorageError> {
        Ok(Self {
            base_url: env::var("SUPABASE_URL")
                .map_err(|_| StorageError::Config("SUPABASE_URL not set".to_string()))?
                .trim_end_matches('/')
                .to_string(),
            service_key: env::var("SUPABASE_SERVICE_KEY")
                .map_err(|_| StorageError::Config("SUPABASE_SERVICE_KEY not set".to_string()))?,
        })
    }
}

/// Write-only blob storage as seen by the upload flows. Uploads land in a
/// named bucket and are referenced afterwards by their public address.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Client for the hosted object store.
pub struct StorageClient {
    http: reqwest::Client,
    config: StorageConfig,
}

impl StorageClient {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            http: reqwest::Client::new(),
            config: StorageConfig::from_env()?,
        })
    }

    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url, bucket, name
        )
    }
}

#[async_trait]
impl BlobStore for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.config.base_url, bucket, name);

        info!("Uploading {} bytes to {}/{}", bytes.len(), bucket, name);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.service_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload { status, message });
        }

        Ok(self.public_url(bucket, name))
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Por favor sube solo archivos PDF.")]
    NotPdf,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Stores an uploaded medical report in the reports bucket under a fresh
/// timestamped name. Anything that is not a PDF is rejected before any
/// upload happens.
pub async fn store_report<B>(
    blobs: &B,
    content_type: &str,
    body: Vec<u8>,
) -> Result<String, ReportError>
where
    B: BlobStore + ?Sized,
{
    if content_type != "application/pdf" {
        return Err(ReportError::NotPdf);
    }

    let name = format!(
        "report_{}_{}.pdf",
        Utc::now().timestamp_millis(),
        random_token(7)
    );
    let url = blobs
        .upload(REPORTS_BUCKET, &name, body, "application/pdf")
        .await?;
    Ok(url)
}
