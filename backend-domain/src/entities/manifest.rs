// Manifest entities
// The persisted blob keeps only what the upload contained; display fields
// are recomputed from the ledger, never stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::EventId;

/// Raw parsed workbook attached to a MANIFEST-mode container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestBlob {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
    pub sku_column_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_column_key: Option<String>,
    pub file_name: String,
}

impl ManifestBlob {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One line of the manifest with its computed display fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestRow {
    /// Original spreadsheet columns keyed by header.
    pub cells: HashMap<String, String>,
    /// Normalized (trimmed) SKU value from the SKU column.
    pub sku: String,
    pub expected_qty: i64,
    pub scanned_sku: String,
    pub scanned_qty: i64,
    pub pallet_no: String,
    pub box_no: String,
    pub operator: String,
    pub event_ids: Vec<EventId>,
}

impl ManifestRow {
    /// Build the base (unscanned) rows for a blob. Non-numeric expected
    /// quantities normalize to 0.
    pub fn base_rows(blob: &ManifestBlob) -> Vec<ManifestRow> {
        blob.rows
            .iter()
            .map(|cells| {
                let sku = cells
                    .get(&blob.sku_column_key)
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default();
                let expected_qty = blob
                    .qty_column_key
                    .as_ref()
                    .and_then(|key| cells.get(key))
                    .map(|value| parse_qty(value))
                    .unwrap_or(0);
                ManifestRow {
                    cells: cells.clone(),
                    sku,
                    expected_qty,
                    ..ManifestRow::default()
                }
            })
            .collect()
    }
}

/// One SKU's running total in MANUAL mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyEntry {
    pub sku: String,
    pub qty: i64,
    pub pallet_no: String,
    pub event_ids: Vec<EventId>,
}

pub fn parse_qty(value: &str) -> i64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<f64>().map(|v| v as i64))
        .unwrap_or(0)
}
