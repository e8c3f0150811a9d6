// Container entity
// One physical shipment being reconciled; the grouping for scan events

use serde::{Deserialize, Serialize};

use crate::entities::ManifestBlob;
use crate::value_objects::ContainerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerMode {
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "MANIFEST")]
    Manifest,
}

impl ContainerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerMode::Manual => "MANUAL",
            ContainerMode::Manifest => "MANIFEST",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "MANUAL" => Some(ContainerMode::Manual),
            "MANIFEST" => Some(ContainerMode::Manifest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "ARCHIVED")]
    Archived,
}

impl ContainerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Active => "ACTIVE",
            ContainerStatus::Completed => "COMPLETED",
            ContainerStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(ContainerStatus::Active),
            "COMPLETED" => Some(ContainerStatus::Completed),
            "ARCHIVED" => Some(ContainerStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub container_no: String,
    pub description: String,
    pub dock_no: String,
    pub mode: ContainerMode,
    pub status: ContainerStatus,
    /// Present only in MANIFEST mode, attached or replaced via upload.
    pub manifest: Option<ManifestBlob>,
    pub created_by: String,
    pub created_at: i64,
}

/// Container plus the derived scan count, as returned by list queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    #[serde(flatten)]
    pub container: Container,
    pub scan_count: i64,
}
