use tracing::info;

use backend_domain::ports::{ContainerRepository, ScanEventRepository};
use backend_domain::{
    current_millis, Container, ContainerId, ContainerMode, ContainerStatus, EventId,
    ScanCorrection, ScanEvent,
};

use crate::dtos::SubmitScanRequest;
use crate::{AppError, AppState};

/// Submit one scan. Repeated scans of the same SKU append new events; the
/// aggregator's summation produces the totals. The container is auto-created
/// (MANUAL mode) when the number has not been seen before.
pub async fn submit_scan(
    state: &AppState,
    request: SubmitScanRequest,
) -> Result<ScanEvent, AppError> {
    let container_no = request.container_no.trim().to_string();
    if container_no.is_empty() {
        state.metrics.record_scan_error();
        return Err(AppError::BadRequest("container_no is empty".to_string()));
    }
    let sku = request.sku.trim().to_string();
    if sku.is_empty() {
        state.metrics.record_scan_error();
        return Err(AppError::BadRequest("sku is empty".to_string()));
    }
    let qty = request.qty.unwrap_or(1);
    if qty <= 0 {
        state.metrics.record_scan_error();
        return Err(AppError::BadRequest(format!("qty must be positive, got {}", qty)));
    }

    let container = match state
        .container_repo
        .find_by_number(&container_no)
        .await
        .map_err(AppError::Internal)?
    {
        Some(container) => container,
        None => {
            let container = Container {
                id: ContainerId::generate(),
                container_no: container_no.clone(),
                description: String::new(),
                dock_no: String::new(),
                mode: ContainerMode::Manual,
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
            info!(container_no = %container_no, "container auto-created on first scan");
            container
        }
    };

    let event = ScanEvent {
        id: EventId::generate(),
        container_id: container.id.clone(),
        sku,
        raw_code: if request.raw_code.is_empty() {
            request.sku.clone()
        } else {
            request.raw_code.clone()
        },
        qty,
        pallet_no: request.pallet_no.trim().to_string(),
        box_no: request.box_no.trim().to_string(),
        operator: request.operator.trim().to_string(),
        created_at: current_millis(),
    };
    if let Err(err) = state.scan_repo.insert(&event).await {
        state.metrics.record_scan_error();
        return Err(AppError::Internal(err));
    }
    state.metrics.record_scan();
    Ok(event)
}

/// Overwrite qty/pallet/box/operator on exactly one event. Exists solely for
/// post-hoc adjustment of a displayed cell.
pub async fn correct_scan(
    state: &AppState,
    event_id: &str,
    correction: ScanCorrection,
) -> Result<ScanEvent, AppError> {
    if correction.is_empty() {
        return Err(AppError::BadRequest("correction has no fields".to_string()));
    }
    if let Some(qty) = correction.qty {
        if qty < 0 {
            return Err(AppError::BadRequest(format!("qty must not be negative, got {}", qty)));
        }
    }

    let id = EventId(event_id.to_string());
    let mut event = state
        .scan_repo
        .find(&id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("scan event {}", id)))?;

    correction.apply(&mut event);
    state
        .scan_repo
        .update(&event)
        .await
        .map_err(AppError::Internal)?;
    Ok(event)
}

pub async fn delete_scan(state: &AppState, event_id: &str) -> Result<(), AppError> {
    let id = EventId(event_id.to_string());
    state
        .scan_repo
        .find(&id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("scan event {}", id)))?;
    state
        .scan_repo
        .delete(&id)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}
