use tracing::error;

use backend_domain::ports::ContainerRepository;
use backend_domain::{ContainerStatus, ContainerSummary};

use crate::dtos::ContainerQuery;
use crate::{AppError, AppState};

pub async fn list_containers(
    state: &AppState,
    query: ContainerQuery,
) -> Result<Vec<ContainerSummary>, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(
            ContainerStatus::parse(value)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status '{}'", value)))?,
        ),
    };
    let container_no = query
        .container_no
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    state
        .container_repo
        .list(status, container_no)
        .await
        .map_err(|err| {
            error!("failed to list containers: {}", err);
            AppError::Internal(err)
        })
}
