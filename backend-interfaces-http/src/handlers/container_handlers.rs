use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::error;

use backend_application::commands::container_commands;
use backend_application::dtos::{ContainerQuery, CreateContainerRequest, UpdateContainerRequest};
use backend_application::queries::container_queries;
use backend_application::AppState;
use backend_domain::{Container, ContainerSummary};
use backend_infrastructure::codec::manifest_import;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_manifest_upload};

pub async fn list_containers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ContainerQuery>,
) -> Result<Json<Vec<ContainerSummary>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let containers = container_queries::list_containers(&state, query).await?;
    Ok(Json(containers))
}

pub async fn create_container(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateContainerRequest>,
) -> Result<(StatusCode, Json<Container>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let container = container_commands::create_container(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(container)))
}

pub async fn update_container(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContainerRequest>,
) -> Result<Json<Container>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let container = container_commands::update_container(&state, &id, payload).await?;
    Ok(Json(container))
}

pub async fn delete_container(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    container_commands::delete_container(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse an uploaded sheet and attach the blob to the container.
pub async fn upload_manifest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<Container>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let upload = parse_manifest_upload(&headers, &body).map_err(|err| {
        error!("failed to parse manifest upload: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let blob = manifest_import::parse_manifest(&upload.file_name, &upload.content)
        .map_err(|err| HttpError::BadRequest(err.to_string()))?;

    let request = UpdateContainerRequest {
        manifest: Some(blob),
        ..UpdateContainerRequest::default()
    };
    let container = container_commands::update_container(&state, &id, request).await?;
    state.metrics.record_manifest_upload();
    Ok(Json(container))
}
