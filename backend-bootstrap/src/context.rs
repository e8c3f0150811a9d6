use std::sync::Arc;

use anyhow::Result;

use backend_application::{AppState, Metrics};
use backend_domain::ContainerRepository;
use backend_infrastructure::{AppConfig, SqliteRepo};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let repo = Arc::new(SqliteRepo::open(&runtime_config.database_path).await?);
        repo.ensure_schema().await?;

        let state = AppState {
            config: runtime_config,
            container_repo: repo.clone(),
            scan_repo: repo,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
