use std::sync::Arc;

use backend_domain::ports::{ContainerRepository, ScanEventRepository};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub container_repo: Arc<dyn ContainerRepository>,
    pub scan_repo: Arc<dyn ScanEventRepository>,
    pub metrics: Arc<Metrics>,
}
