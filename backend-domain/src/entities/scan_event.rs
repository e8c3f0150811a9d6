// Scan event entity
// One atomic scan contribution to a container's ledger

use serde::{Deserialize, Serialize};

use crate::value_objects::{ContainerId, EventId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: EventId,
    pub container_id: ContainerId,
    /// Resolved target key: the manifest row's SKU, or the raw code when
    /// unmatched or scanned in manual mode.
    pub sku: String,
    /// Exact bytes the scanner emitted.
    pub raw_code: String,
    pub qty: i64,
    pub pallet_no: String,
    pub box_no: String,
    pub operator: String,
    pub created_at: i64,
}

/// Partial field overwrite applied to exactly one event by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanCorrection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pallet_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl ScanCorrection {
    pub fn is_empty(&self) -> bool {
        self.qty.is_none()
            && self.pallet_no.is_none()
            && self.box_no.is_none()
            && self.operator.is_none()
    }

    pub fn apply(&self, event: &mut ScanEvent) {
        if let Some(qty) = self.qty {
            event.qty = qty;
        }
        if let Some(pallet_no) = &self.pallet_no {
            event.pallet_no = pallet_no.clone();
        }
        if let Some(box_no) = &self.box_no {
            event.box_no = box_no.clone();
        }
        if let Some(operator) = &self.operator {
            event.operator = operator.clone();
        }
    }
}
