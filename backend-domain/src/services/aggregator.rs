// Ledger aggregation
// Pure derivation from the event stream; recomputable at any time, no
// hidden counters. Strategy is selected by container mode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Container, ContainerMode, ManifestBlob, ManifestRow, ScanEvent, TallyEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum AggregatedView {
    Manifest { rows: Vec<ManifestRow> },
    Manual { entries: Vec<TallyEntry> },
}

impl AggregatedView {
    pub fn manifest_rows(&self) -> Option<&[ManifestRow]> {
        match self {
            AggregatedView::Manifest { rows } => Some(rows),
            AggregatedView::Manual { .. } => None,
        }
    }

    pub fn tally_entries(&self) -> Option<&[TallyEntry]> {
        match self {
            AggregatedView::Manifest { .. } => None,
            AggregatedView::Manual { entries } => Some(entries),
        }
    }
}

pub trait Aggregation: Send + Sync {
    fn aggregate(&self, events: &[ScanEvent]) -> AggregatedView;
}

/// MANIFEST mode: events land on the row whose normalized SKU equals the
/// event's resolved sku; unmatched skus become ad hoc rows in first-seen
/// order.
pub struct ManifestAggregation {
    base_rows: Vec<ManifestRow>,
    sku_column_key: String,
}

impl ManifestAggregation {
    pub fn new(blob: &ManifestBlob) -> Self {
        Self {
            base_rows: ManifestRow::base_rows(blob),
            sku_column_key: blob.sku_column_key.clone(),
        }
    }
}

impl Aggregation for ManifestAggregation {
    fn aggregate(&self, events: &[ScanEvent]) -> AggregatedView {
        let mut rows = self.base_rows.clone();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if !row.sku.is_empty() {
                index.entry(row.sku.clone()).or_insert(i);
            }
        }

        for event in events {
            let sku = event.sku.trim().to_string();
            if sku.is_empty() {
                continue;
            }
            let i = match index.get(&sku) {
                Some(i) => *i,
                None => {
                    let mut row = ManifestRow {
                        sku: sku.clone(),
                        ..ManifestRow::default()
                    };
                    row.cells
                        .insert(self.sku_column_key.clone(), sku.clone());
                    rows.push(row);
                    let i = rows.len() - 1;
                    index.insert(sku, i);
                    i
                }
            };
            apply_event_to_row(&mut rows[i], event);
        }

        AggregatedView::Manifest { rows }
    }
}

/// MANUAL mode: a running tally per resolved sku, first-seen order.
pub struct ManualAggregation;

impl Aggregation for ManualAggregation {
    fn aggregate(&self, events: &[ScanEvent]) -> AggregatedView {
        let mut entries: Vec<TallyEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for event in events {
            let sku = event.sku.trim().to_string();
            if sku.is_empty() {
                continue;
            }
            let i = *index.entry(sku.clone()).or_insert_with(|| {
                entries.push(TallyEntry {
                    sku,
                    ..TallyEntry::default()
                });
                entries.len() - 1
            });
            let entry = &mut entries[i];
            entry.qty += event.qty;
            if !event.pallet_no.trim().is_empty() {
                entry.pallet_no = event.pallet_no.clone();
            }
            entry.event_ids.push(event.id.clone());
        }

        AggregatedView::Manual { entries }
    }
}

pub fn aggregation_for(container: &Container) -> Box<dyn Aggregation> {
    match container.mode {
        ContainerMode::Manifest => {
            let blob = container.manifest.clone().unwrap_or_default();
            Box::new(ManifestAggregation::new(&blob))
        }
        ContainerMode::Manual => Box::new(ManualAggregation),
    }
}

fn apply_event_to_row(row: &mut ManifestRow, event: &ScanEvent) {
    row.scanned_qty += event.qty;
    // Last non-empty value wins; an empty correction never erases a
    // previously recorded value.
    if !event.raw_code.trim().is_empty() {
        row.scanned_sku = event.raw_code.clone();
    }
    if !event.pallet_no.trim().is_empty() {
        row.pallet_no = event.pallet_no.clone();
    }
    if !event.box_no.trim().is_empty() {
        row.box_no = event.box_no.clone();
    }
    if !event.operator.trim().is_empty() {
        row.operator = event.operator.clone();
    }
    row.event_ids.push(event.id.clone());
}
