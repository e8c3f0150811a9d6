use tracing::{error, info};

use backend_domain::ports::ContainerRepository;
use backend_domain::{
    current_millis, Container, ContainerId, ContainerMode, ContainerStatus,
};

use crate::dtos::{CreateContainerRequest, UpdateContainerRequest};
use crate::{AppError, AppState};

pub async fn create_container(
    state: &AppState,
    request: CreateContainerRequest,
) -> Result<Container, AppError> {
    let container_no = request.container_no.trim().to_string();
    if container_no.is_empty() {
        return Err(AppError::BadRequest("container_no is empty".to_string()));
    }
    let mode = ContainerMode::parse(&request.mode)
        .ok_or_else(|| AppError::BadRequest(format!("unknown mode '{}'", request.mode)))?;

    if let Some(existing) = state
        .container_repo
        .find_by_number(&container_no)
        .await
        .map_err(AppError::Internal)?
    {
        return Err(AppError::Conflict(format!(
            "container {} already exists",
            existing.container_no
        )));
    }

    let container = Container {
        id: ContainerId::generate(),
        container_no,
        description: request.description.trim().to_string(),
        dock_no: request.dock_no.trim().to_string(),
        mode,
        status: ContainerStatus::Active,
        manifest: None,
        created_by: request.operator.trim().to_string(),
        created_at: current_millis(),
    };
    state
        .container_repo
        .insert(&container)
        .await
        .map_err(AppError::Internal)?;
    info!(container_no = %container.container_no, mode = mode.as_str(), "container created");
    Ok(container)
}

pub async fn update_container(
    state: &AppState,
    id: &str,
    request: UpdateContainerRequest,
) -> Result<Container, AppError> {
    let id = ContainerId(id.to_string());
    let mut container = state
        .container_repo
        .find_by_id(&id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("container {}", id)))?;

    if let Some(status) = &request.status {
        container.status = ContainerStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest(format!("unknown status '{}'", status)))?;
    }
    if let Some(description) = &request.description {
        container.description = description.trim().to_string();
    }
    if let Some(dock_no) = &request.dock_no {
        container.dock_no = dock_no.trim().to_string();
    }
    if let Some(manifest) = request.manifest {
        if container.mode != ContainerMode::Manifest {
            return Err(AppError::BadRequest(
                "manifest can only be attached in MANIFEST mode".to_string(),
            ));
        }
        container.manifest = Some(manifest);
    }

    state
        .container_repo
        .update(&container)
        .await
        .map_err(AppError::Internal)?;
    Ok(container)
}

pub async fn delete_container(state: &AppState, id: &str) -> Result<(), AppError> {
    let id = ContainerId(id.to_string());
    let container = state
        .container_repo
        .find_by_id(&id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("container {}", id)))?;

    if let Err(err) = state.container_repo.delete(&container.id).await {
        error!("failed to delete container {}: {}", container.container_no, err);
        return Err(AppError::Internal(err));
    }
    info!(container_no = %container.container_no, "container deleted with its scan events");
    Ok(())
}
