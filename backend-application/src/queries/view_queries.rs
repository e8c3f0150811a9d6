use tracing::error;

use backend_domain::ports::{ContainerRepository, ScanEventRepository};
use backend_domain::services::{aggregation_for, Aggregation};
use backend_domain::{AggregatedView, Container, ContainerId};

use crate::{AppError, AppState};

/// Recompute the display state for one container from its ledger. Used by
/// the export handlers; clients run the same aggregation locally.
pub async fn container_view(
    state: &AppState,
    id: &str,
) -> Result<(Container, AggregatedView), AppError> {
    let id = ContainerId(id.to_string());
    let container = state
        .container_repo
        .find_by_id(&id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("container {}", id)))?;

    let events = state
        .scan_repo
        .list_for_container(&container.id)
        .await
        .map_err(|err| {
            error!("failed to load ledger for {}: {}", container.container_no, err);
            AppError::Internal(err)
        })?;

    let view = aggregation_for(&container).aggregate(&events);
    Ok((container, view))
}
