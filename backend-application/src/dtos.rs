// Request/response payloads shared between the HTTP layer and commands

use serde::{Deserialize, Serialize};

use backend_domain::ManifestBlob;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContainerRequest {
    pub container_no: String,
    #[serde(default)]
    pub description: String,
    pub mode: String,
    #[serde(default)]
    pub dock_no: String,
    #[serde(default)]
    pub operator: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContainerRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dock_no: Option<String>,
    #[serde(default)]
    pub manifest: Option<ManifestBlob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitScanRequest {
    pub container_no: String,
    pub sku: String,
    #[serde(default)]
    pub raw_code: String,
    #[serde(default)]
    pub qty: Option<i64>,
    #[serde(default)]
    pub pallet_no: String,
    #[serde(default)]
    pub box_no: String,
    #[serde(default)]
    pub operator: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub container_no: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub container_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestUploadRequest {
    pub file_name: String,
    /// Raw delimited text of the uploaded sheet.
    pub content: String,
}
