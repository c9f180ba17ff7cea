use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileServiceError {
    #[error("file service answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("file service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest {
    /// The caller's `user` header, forwarded verbatim.
    pub user: String,
    pub static_file: bool,
    pub filename: Option<String>,
    pub max_size_mb: u32,
}

/// The file-storage service that owns uploaded assets.
#[async_trait]
pub trait FileService: Send + Sync + 'static {
    async fn signed_url(&self, request: &SignedUrlRequest) -> Result<String, FileServiceError>;

    async fn delete_file(&self, filename: &str) -> Result<String, FileServiceError>;
}

pub struct HttpFileService {
    client: Client,
    base_url: String,
    secret: String,
}

impl HttpFileService {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        }
    }

    async fn read_success(response: reqwest::Response) -> Result<String, FileServiceError> {
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(FileServiceError::Rejected { status, body });
        }
        Ok(body)
    }
}

#[async_trait]
impl FileService for HttpFileService {
    async fn signed_url(&self, request: &SignedUrlRequest) -> Result<String, FileServiceError> {
        let max_size = request.max_size_mb.to_string();
        let mut params = vec![
            ("user", request.user.as_str()),
            ("inter_communication_secret", self.secret.as_str()),
            ("static_file", if request.static_file { "true" } else { "false" }),
            ("max_sizeMB", max_size.as_str()),
        ];
        if let Some(filename) = request.filename.as_deref() {
            params.push(("filename", filename));
        }

        let response = self
            .client
            .get(format!("{}/signed-url", self.base_url))
            .query(&params)
            .send()
            .await?;

        let url = Self::read_success(response).await?;
        Ok(url.trim().trim_matches('"').to_string())
    }

    async fn delete_file(&self, filename: &str) -> Result<String, FileServiceError> {
        let response = self
            .client
            .post(format!("{}/delete-file", self.base_url))
            .query(&[
                ("filename", filename),
                ("inter_communication_secret", self.secret.as_str()),
                ("static_file", "true"),
            ])
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        tracing::info!(%filename, "file service deleted asset");
        Ok(body)
    }
}
