use tracing::error;

use backend_domain::ports::{ContainerRepository, ScanEventRepository};
use backend_domain::{Container, ContainerId, ScanEvent};

use crate::dtos::ScanQuery;
use crate::{AppError, AppState};

/// Ordered scan events for a container, addressed by id or by number.
pub async fn list_scans(state: &AppState, query: ScanQuery) -> Result<Vec<ScanEvent>, AppError> {
    let container = resolve_container(state, &query).await?;
    state
        .scan_repo
        .list_for_container(&container.id)
        .await
        .map_err(|err| {
            error!("failed to list scans for {}: {}", container.container_no, err);
            AppError::Internal(err)
        })
}

pub async fn resolve_container(
    state: &AppState,
    query: &ScanQuery,
) -> Result<Container, AppError> {
    if let Some(id) = query.container_id.as_deref().map(str::trim) {
        if !id.is_empty() {
            return state
                .container_repo
                .find_by_id(&ContainerId(id.to_string()))
                .await
                .map_err(AppError::Internal)?
                .ok_or_else(|| AppError::NotFound(format!("container {}", id)));
        }
    }
    if let Some(container_no) = query.container_no.as_deref().map(str::trim) {
        if !container_no.is_empty() {
            return state
                .container_repo
                .find_by_number(container_no)
                .await
                .map_err(AppError::Internal)?
                .ok_or_else(|| AppError::NotFound(format!("container {}", container_no)));
        }
    }
    Err(AppError::BadRequest(
        "container_id or container_no is required".to_string(),
    ))
}
