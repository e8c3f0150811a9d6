// Ledger polling
// A scheduled single-flight task: the timer fires on cadence, but a tick
// that lands while a poll is still outstanding is skipped entirely. The
// cadence widens once the ledger grows past the slow threshold.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::LedgerApi;
use crate::view::SharedView;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub base_interval: Duration,
    pub slow_interval: Duration,
    /// Ledger size above which the slow interval applies.
    pub slow_threshold: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(3),
            slow_interval: Duration::from_secs(5),
            slow_threshold: 100,
        }
    }
}

pub struct SyncWorker {
    api: Arc<dyn LedgerApi>,
    container_no: String,
    view: SharedView,
    config: SyncConfig,
    in_flight: Arc<AtomicBool>,
}

pub struct SyncHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

impl SyncWorker {
    pub fn new(
        api: Arc<dyn LedgerApi>,
        container_no: impl Into<String>,
        view: SharedView,
        config: SyncConfig,
    ) -> Self {
        Self {
            api,
            container_no: container_no.into(),
            view,
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn spawn(self) -> SyncHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                let interval = interval_for(self.view.event_count().await, &self.config);
                tokio::select! {
                    _ = tokio::time::sleep(interval) => self.tick(),
                    _ = &mut stop_rx => break,
                }
            }
        });
        SyncHandle {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Fire one poll. Skipped entirely when the previous poll has not come
    /// back yet; no queuing, no overlap.
    pub fn tick(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!(container_no = %self.container_no, "poll still outstanding, tick skipped");
            return;
        }
        let api = self.api.clone();
        let view = self.view.clone();
        let container_no = self.container_no.clone();
        let in_flight = self.in_flight.clone();
        tokio::spawn(async move {
            let generation = view.local_generation().await;
            match api.list_scans(&container_no).await {
                Ok(events) => {
                    if !view.sync_replace(generation, events).await {
                        debug!(container_no = %container_no, "local dataset newer, poll discarded");
                    }
                }
                Err(err) => {
                    // Previous view stays; the operator keeps scanning.
                    warn!(container_no = %container_no, "ledger poll failed: {}", err);
                }
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }
}

fn interval_for(event_count: usize, config: &SyncConfig) -> Duration {
    if event_count > config.slow_threshold {
        config.slow_interval
    } else {
        config.base_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    use backend_domain::services::ManualAggregation;
    use backend_domain::{
        Container, ContainerId, ContainerMode, ContainerStatus, EventId, ScanCorrection,
        ScanEvent,
    };

    use crate::api::{ApiError, SubmitScan};

    fn event(sku: &str) -> ScanEvent {
        ScanEvent {
            id: EventId::generate(),
            container_id: ContainerId("c1".to_string()),
            sku: sku.to_string(),
            raw_code: sku.to_string(),
            qty: 1,
            pallet_no: String::new(),
            box_no: String::new(),
            operator: "alice".to_string(),
            created_at: 0,
        }
    }

    /// Stub ledger whose fetch blocks until released, for exercising the
    /// single-flight guard.
    struct GatedLedger {
        calls: AtomicUsize,
        gate: Notify,
        events: Mutex<Vec<ScanEvent>>,
        fail: bool,
    }

    impl GatedLedger {
        fn new(events: Vec<ScanEvent>, fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                events: Mutex::new(events),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerApi for GatedLedger {
        async fn submit_scan(&self, _payload: &SubmitScan) -> Result<ScanEvent, ApiError> {
            unimplemented!("not exercised")
        }
        async fn correct_scan(
            &self,
            _id: &str,
            _correction: &ScanCorrection,
        ) -> Result<ScanEvent, ApiError> {
            unimplemented!("not exercised")
        }
        async fn delete_scan(&self, _id: &str) -> Result<(), ApiError> {
            unimplemented!("not exercised")
        }
        async fn upload_manifest(
            &self,
            _container_id: &str,
            _file_name: &str,
            _content: &str,
        ) -> Result<Container, ApiError> {
            unimplemented!("not exercised")
        }
        async fn list_scans(&self, _container_no: &str) -> Result<Vec<ScanEvent>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail {
                return Err(ApiError::Server {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.events.lock().unwrap().clone())
        }
    }

    fn worker(api: Arc<GatedLedger>) -> (SyncWorker, SharedView) {
        let view = SharedView::new(Box::new(ManualAggregation));
        let worker = SyncWorker::new(api, "CNT-1", view.clone(), SyncConfig::default());
        (worker, view)
    }

    async fn wait_until_idle(worker: &SyncWorker) {
        while worker.is_polling() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn overlapping_tick_is_skipped() {
        let api = Arc::new(GatedLedger::new(vec![event("SKU9")], false));
        let (worker, view) = worker(api.clone());

        worker.tick();
        tokio::task::yield_now().await;
        assert_eq!(api.calls(), 1);

        // Second tick fires while the first poll is still outstanding.
        worker.tick();
        tokio::task::yield_now().await;
        assert_eq!(api.calls(), 1);

        api.gate.notify_one();
        wait_until_idle(&worker).await;
        let current = view.current().await;
        assert_eq!(current.tally_entries().unwrap().len(), 1);

        worker.tick();
        tokio::task::yield_now().await;
        assert_eq!(api.calls(), 2);
        api.gate.notify_one();
        wait_until_idle(&worker).await;
    }

    #[tokio::test]
    async fn failed_poll_keeps_the_previous_view() {
        let api = Arc::new(GatedLedger::new(vec![], true));
        let (worker, view) = worker(api.clone());
        view.apply_local(vec![event("SKU9")]).await;

        worker.tick();
        api.gate.notify_one();
        wait_until_idle(&worker).await;

        let current = view.current().await;
        assert_eq!(current.tally_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn poll_result_is_discarded_when_local_dataset_is_newer() {
        let api = Arc::new(GatedLedger::new(vec![], false));
        let (worker, view) = worker(api.clone());
        view.apply_local(vec![event("SKU9")]).await;

        worker.tick();
        tokio::task::yield_now().await;
        // Manifest parsed while the poll is in flight.
        view.apply_local(vec![event("SKU9"), event("SKU9")]).await;
        api.gate.notify_one();
        wait_until_idle(&worker).await;

        let current = view.current().await;
        assert_eq!(current.tally_entries().unwrap()[0].qty, 2);
    }

    #[test]
    fn interval_widens_past_the_threshold() {
        let config = SyncConfig::default();
        assert_eq!(interval_for(0, &config), Duration::from_secs(3));
        assert_eq!(interval_for(100, &config), Duration::from_secs(3));
        assert_eq!(interval_for(101, &config), Duration::from_secs(5));
    }
}
