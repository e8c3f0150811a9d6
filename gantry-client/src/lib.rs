// Operator-side client for the scan reconciliation backend:
// HTTP api, scan session, polling sync worker, local snapshot cache.

pub mod api;
pub mod device;
pub mod session;
pub mod snapshot;
pub mod sync;
pub mod view;

pub use api::{ApiClient, ApiError, ClientConfig, LedgerApi};
pub use device::CameraError;
pub use session::{ScanOutcome, ScanSession, SessionError, SubMode};
pub use snapshot::{Snapshot, SnapshotStore, SnapshotWriter};
pub use sync::{SyncConfig, SyncHandle, SyncWorker};
pub use view::SharedView;
