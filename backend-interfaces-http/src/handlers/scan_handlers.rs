use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::scan_commands;
use backend_application::dtos::{ScanQuery, SubmitScanRequest};
use backend_application::queries::scan_queries;
use backend_application::AppState;
use backend_domain::{ScanCorrection, ScanEvent};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn list_scans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ScanQuery>,
) -> Result<Json<Vec<ScanEvent>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let events = scan_queries::list_scans(&state, query).await?;
    Ok(Json(events))
}

pub async fn submit_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitScanRequest>,
) -> Result<(StatusCode, Json<ScanEvent>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let event = scan_commands::submit_scan(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn correct_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ScanCorrection>,
) -> Result<Json<ScanEvent>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let event = scan_commands::correct_scan(&state, &id, payload).await?;
    Ok(Json(event))
}

pub async fn delete_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    scan_commands::delete_scan(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
