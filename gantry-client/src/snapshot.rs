// Crash-recovery cache
// One JSON file per container id; writes are debounced so a burst of table
// changes collapses into a single write. Best effort: a failed write logs
// and scanning continues.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::warn;

use backend_domain::{current_millis, ManifestRow};

pub const SNAPSHOT_DEBOUNCE_MS: u64 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub headers: Vec<String>,
    pub rows: Vec<ManifestRow>,
    pub sku_column_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_column_key: Option<String>,
    pub timestamp: i64,
}

impl Snapshot {
    pub fn new(
        headers: Vec<String>,
        rows: Vec<ManifestRow>,
        sku_column_key: String,
        qty_column_key: Option<String>,
    ) -> Self {
        Self {
            headers,
            rows,
            sku_column_key,
            qty_column_key,
            timestamp: current_millis(),
        }
    }
}

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, container_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", container_id))
    }

    /// Returns the cached snapshot when one exists and parses; anything
    /// else is treated as no snapshot.
    pub async fn load(&self, container_id: &str) -> Option<Snapshot> {
        let path = self.path_for(container_id);
        let content = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(container_id, "discarding unreadable snapshot: {}", err);
                None
            }
        }
    }

    pub async fn save(&self, container_id: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string(snapshot)?;
        fs::write(self.path_for(container_id), content).await?;
        Ok(())
    }

    pub async fn clear(&self, container_id: &str) {
        let _ = fs::remove_file(self.path_for(container_id)).await;
    }
}

/// Debounced writer scoped to one container: schedule-on-change,
/// cancel-and-reschedule on further changes, flush on container switch.
pub struct SnapshotWriter {
    store: Arc<SnapshotStore>,
    container_id: String,
    delay: Duration,
    pending: Arc<Mutex<Option<Snapshot>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SnapshotWriter {
    pub fn new(store: Arc<SnapshotStore>, container_id: impl Into<String>) -> Self {
        Self::with_delay(
            store,
            container_id,
            Duration::from_millis(SNAPSHOT_DEBOUNCE_MS),
        )
    }

    pub fn with_delay(
        store: Arc<SnapshotStore>,
        container_id: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            container_id: container_id.into(),
            delay,
            pending: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
        }
    }

    /// Record the latest state and (re)arm the write timer. Repeated calls
    /// within the window collapse to one write of the newest snapshot.
    pub fn schedule(&self, snapshot: Snapshot) {
        *self.pending.lock().unwrap() = Some(snapshot);

        let mut timer = self.timer.lock().unwrap();
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let store = self.store.clone();
        let container_id = self.container_id.clone();
        let pending = self.pending.clone();
        let delay = self.delay;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            write_pending(&store, &container_id, &pending).await;
        }));
    }

    /// Write whatever is pending right now, cancelling the timer.
    pub async fn flush(&self) {
        let handle = self.timer.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.abort();
        }
        write_pending(&self.store, &self.container_id, &self.pending).await;
    }
}

async fn write_pending(
    store: &SnapshotStore,
    container_id: &str,
    pending: &Mutex<Option<Snapshot>>,
) {
    let snapshot = pending.lock().unwrap().take();
    if let Some(snapshot) = snapshot {
        if let Err(err) = store.save(container_id, &snapshot).await {
            warn!(container_id, "snapshot write failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_rows(count: usize) -> Snapshot {
        let rows = (0..count)
            .map(|i| ManifestRow {
                sku: format!("SKU{}", i),
                ..ManifestRow::default()
            })
            .collect();
        Snapshot::new(vec!["SKU".to_string()], rows, "SKU".to_string(), None)
    }

    #[tokio::test]
    async fn save_load_clear_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());

        assert!(store.load("c1").await.is_none());
        store.save("c1", &snapshot_with_rows(2)).await.expect("save");
        let loaded = store.load("c1").await.expect("loaded");
        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.sku_column_key, "SKU");

        store.clear("c1").await;
        assert!(store.load("c1").await.is_none());
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        tokio::fs::create_dir_all(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("c1.json"), "not json")
            .await
            .unwrap();
        assert!(store.load("c1").await.is_none());
    }

    #[tokio::test]
    async fn rapid_changes_collapse_to_the_newest_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::new(dir.path()));
        let writer = SnapshotWriter::with_delay(store.clone(), "c1", Duration::from_millis(50));

        writer.schedule(snapshot_with_rows(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.schedule(snapshot_with_rows(3));

        // Well past the debounce window; only the newest state is on disk.
        tokio::time::sleep(Duration::from_millis(300)).await;
        let loaded = store.load("c1").await.expect("written");
        assert_eq!(loaded.rows.len(), 3);
    }

    #[tokio::test]
    async fn flush_writes_immediately_and_disarms_the_timer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(SnapshotStore::new(dir.path()));
        let writer = SnapshotWriter::with_delay(store.clone(), "c1", Duration::from_secs(2));

        writer.schedule(snapshot_with_rows(2));
        writer.flush().await;
        let loaded = store.load("c1").await.expect("written");
        assert_eq!(loaded.rows.len(), 2);

        // Nothing pending anymore; a later flush is a no-op.
        store.clear("c1").await;
        writer.flush().await;
        assert!(store.load("c1").await.is_none());
    }
}
