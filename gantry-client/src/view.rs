// Shared aggregated view of one container's ledger.
// Local mutations bump a generation counter; the sync worker's wholesale
// replace is skipped when a locally-built dataset is newer than the poll.

use std::sync::Arc;

use tokio::sync::RwLock;

use backend_domain::services::Aggregation;
use backend_domain::{AggregatedView, ScanEvent};

struct ViewInner {
    aggregation: Box<dyn Aggregation>,
    events: Vec<ScanEvent>,
    view: AggregatedView,
    local_generation: u64,
}

#[derive(Clone)]
pub struct SharedView {
    inner: Arc<RwLock<ViewInner>>,
}

impl SharedView {
    pub fn new(aggregation: Box<dyn Aggregation>) -> Self {
        let view = aggregation.aggregate(&[]);
        Self {
            inner: Arc::new(RwLock::new(ViewInner {
                aggregation,
                events: Vec::new(),
                view,
                local_generation: 0,
            })),
        }
    }

    pub async fn current(&self) -> AggregatedView {
        self.inner.read().await.view.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn local_generation(&self) -> u64 {
        self.inner.read().await.local_generation
    }

    /// Swap the aggregation strategy (e.g. right after a manifest upload)
    /// and rebuild the view from the events already on hand.
    pub async fn set_aggregation(&self, aggregation: Box<dyn Aggregation>) {
        let mut inner = self.inner.write().await;
        inner.aggregation = aggregation;
        inner.view = inner.aggregation.aggregate(&inner.events);
        inner.local_generation += 1;
    }

    /// Replace the dataset from a locally-known event list (snapshot load,
    /// post-submit append). Marks the dataset as locally built.
    pub async fn apply_local(&self, events: Vec<ScanEvent>) {
        let mut inner = self.inner.write().await;
        inner.events = events;
        inner.view = inner.aggregation.aggregate(&inner.events);
        inner.local_generation += 1;
    }

    pub async fn append_local(&self, event: ScanEvent) {
        let mut inner = self.inner.write().await;
        inner.events.push(event);
        inner.view = inner.aggregation.aggregate(&inner.events);
        inner.local_generation += 1;
    }

    /// Locate sub-mode visual confirmation: fills the displayed scanned SKU
    /// and operator on one row without touching the ledger.
    pub async fn mark_located(&self, row_index: usize, code: &str, operator: &str) -> bool {
        let mut inner = self.inner.write().await;
        let marked = match &mut inner.view {
            AggregatedView::Manifest { rows } => match rows.get_mut(row_index) {
                Some(row) => {
                    row.scanned_sku = code.to_string();
                    row.operator = operator.to_string();
                    true
                }
                None => false,
            },
            AggregatedView::Manual { .. } => false,
        };
        if marked {
            inner.local_generation += 1;
        }
        marked
    }

    /// Restore a cached snapshot's rows for immediate display. The ledger
    /// stays authoritative; the next accepted poll rebuilds from events.
    pub async fn restore_manifest_rows(&self, rows: Vec<backend_domain::ManifestRow>) {
        let mut inner = self.inner.write().await;
        inner.view = AggregatedView::Manifest { rows };
        inner.local_generation += 1;
    }

    pub async fn events(&self) -> Vec<ScanEvent> {
        self.inner.read().await.events.clone()
    }

    /// Wholesale replace from a poll. Returns false (and leaves the view
    /// alone) when a local dataset was built after the poll started.
    pub async fn sync_replace(&self, generation_at_poll: u64, events: Vec<ScanEvent>) -> bool {
        let mut inner = self.inner.write().await;
        if inner.local_generation != generation_at_poll {
            return false;
        }
        inner.events = events;
        inner.view = inner.aggregation.aggregate(&inner.events);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::services::ManualAggregation;
    use backend_domain::{ContainerId, EventId};

    fn event(sku: &str, qty: i64) -> ScanEvent {
        ScanEvent {
            id: EventId::generate(),
            container_id: ContainerId("c1".to_string()),
            sku: sku.to_string(),
            raw_code: sku.to_string(),
            qty,
            pallet_no: String::new(),
            box_no: String::new(),
            operator: "alice".to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn poll_replace_applies_when_no_local_changes() {
        let view = SharedView::new(Box::new(ManualAggregation));
        let generation = view.local_generation().await;
        assert!(view.sync_replace(generation, vec![event("SKU9", 2)]).await);
        let entries_view = view.current().await;
        let entries = entries_view.tally_entries().unwrap();
        assert_eq!(entries[0].qty, 2);
    }

    #[tokio::test]
    async fn poll_replace_skipped_when_local_dataset_is_newer() {
        let view = SharedView::new(Box::new(ManualAggregation));
        let generation = view.local_generation().await;
        // Local dataset built while the poll was in flight.
        view.apply_local(vec![event("SKU9", 1), event("SKU9", 1)]).await;
        assert!(!view.sync_replace(generation, vec![]).await);
        let current = view.current().await;
        assert_eq!(current.tally_entries().unwrap()[0].qty, 2);
    }

    #[tokio::test]
    async fn append_recomputes_the_tally() {
        let view = SharedView::new(Box::new(ManualAggregation));
        view.append_local(event("SKU9", 1)).await;
        view.append_local(event("SKU9", 1)).await;
        let current = view.current().await;
        assert_eq!(current.tally_entries().unwrap()[0].qty, 2);
        assert_eq!(view.event_count().await, 2);
    }
}
