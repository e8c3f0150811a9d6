// HTTP client for the backend's /v1 surface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backend_domain::{Container, ContainerSummary, ManifestBlob, ScanCorrection, ScanEvent};

/// Outbound port the session and sync worker talk through; the HTTP client
/// is the production implementation.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn submit_scan(&self, payload: &SubmitScan) -> Result<ScanEvent, ApiError>;
    async fn correct_scan(
        &self,
        id: &str,
        correction: &ScanCorrection,
    ) -> Result<ScanEvent, ApiError>;
    async fn delete_scan(&self, id: &str) -> Result<(), ApiError>;
    async fn upload_manifest(
        &self,
        container_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<Container, ApiError>;
    async fn list_scans(&self, container_no: &str) -> Result<Vec<ScanEvent>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub operator: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3432".to_string(),
            api_token: None,
            operator: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateContainer {
    pub container_no: String,
    pub description: String,
    pub mode: String,
    pub dock_no: String,
    pub operator: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dock_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestBlob>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitScan {
    pub container_no: String,
    pub sku: String,
    pub raw_code: String,
    pub qty: i64,
    pub pallet_no: String,
    pub box_no: String,
    pub operator: String,
}

#[derive(Serialize)]
struct ManifestUpload<'a> {
    file_name: &'a str,
    content: &'a str,
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn operator(&self) -> &str {
        &self.config.operator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn list_containers(
        &self,
        status: Option<&str>,
        container_no: Option<&str>,
    ) -> Result<Vec<ContainerSummary>, ApiError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = status {
            query.push(("status", status));
        }
        if let Some(container_no) = container_no {
            query.push(("container_no", container_no));
        }
        let response = self
            .request(self.http.get(self.url("/v1/containers")).query(&query))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create_container(&self, payload: &CreateContainer) -> Result<Container, ApiError> {
        let response = self
            .request(self.http.post(self.url("/v1/containers")).json(payload))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_container(
        &self,
        id: &str,
        payload: &UpdateContainer,
    ) -> Result<Container, ApiError> {
        let response = self
            .request(
                self.http
                    .put(self.url(&format!("/v1/containers/{}", id)))
                    .json(payload),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_container(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(self.http.delete(self.url(&format!("/v1/containers/{}", id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn upload_manifest(
        &self,
        id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<Container, ApiError> {
        let response = self
            .request(
                self.http
                    .post(self.url(&format!("/v1/containers/{}/manifest", id)))
                    .json(&ManifestUpload { file_name, content }),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn list_scans_by_number(&self, container_no: &str) -> Result<Vec<ScanEvent>, ApiError> {
        let response = self
            .request(
                self.http
                    .get(self.url("/v1/scans"))
                    .query(&[("container_no", container_no)]),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn submit_scan(&self, payload: &SubmitScan) -> Result<ScanEvent, ApiError> {
        let response = self
            .request(self.http.post(self.url("/v1/scans")).json(payload))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn correct_scan(
        &self,
        id: &str,
        correction: &ScanCorrection,
    ) -> Result<ScanEvent, ApiError> {
        let response = self
            .request(
                self.http
                    .put(self.url(&format!("/v1/scans/{}", id)))
                    .json(correction),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_scan(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(self.http.delete(self.url(&format!("/v1/scans/{}", id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn export_result(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .request(
                self.http
                    .get(self.url(&format!("/v1/containers/{}/export/result", id))),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.bytes().await?.to_vec())
    }

    /// None when the backend reports no difference (204).
    pub async fn export_diff(&self, id: &str) -> Result<Option<Vec<u8>>, ApiError> {
        let response = self
            .request(
                self.http
                    .get(self.url(&format!("/v1/containers/{}/export/diff", id))),
            )
            .send()
            .await?;
        let response = Self::check(response).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[async_trait]
impl LedgerApi for ApiClient {
    async fn submit_scan(&self, payload: &SubmitScan) -> Result<ScanEvent, ApiError> {
        ApiClient::submit_scan(self, payload).await
    }

    async fn correct_scan(
        &self,
        id: &str,
        correction: &ScanCorrection,
    ) -> Result<ScanEvent, ApiError> {
        ApiClient::correct_scan(self, id, correction).await
    }

    async fn delete_scan(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_scan(self, id).await
    }

    async fn upload_manifest(
        &self,
        container_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<Container, ApiError> {
        ApiClient::upload_manifest(self, container_id, file_name, content).await
    }

    async fn list_scans(&self, container_no: &str) -> Result<Vec<ScanEvent>, ApiError> {
        ApiClient::list_scans_by_number(self, container_no).await
    }
}
