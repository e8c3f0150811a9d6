use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use backend_application::queries::view_queries;
use backend_application::AppState;
use backend_infrastructure::codec::workbook_export;

use crate::error::HttpError;
use crate::middleware::authorize;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn export_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let (container, view) = view_queries::container_view(&state, &id).await?;
    let bytes = workbook_export::full_result(&container, &view)
        .map_err(|err| HttpError::Internal(err.to_string()))?;
    state.metrics.record_export();
    Ok(workbook_response(
        &format!("{}-result.xlsx", container.container_no),
        bytes,
    ))
}

/// 204 when every row reconciles; there is no file to hand out.
pub async fn export_diff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let (container, view) = view_queries::container_view(&state, &id).await?;
    let bytes = workbook_export::diff_report(&container, &view)
        .map_err(|err| HttpError::BadRequest(err.to_string()))?;
    match bytes {
        Some(bytes) => {
            state.metrics.record_export();
            Ok(workbook_response(
                &format!("{}-diff.xlsx", container.container_no),
                bytes,
            )
            .into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

fn workbook_response(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(XLSX_CONTENT_TYPE),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    (headers, bytes)
}
