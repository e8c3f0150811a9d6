use axum::Router;

use backend_application::AppState;

use crate::handlers::{container_handlers, export_handlers, ops_handlers, scan_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/containers",
            axum::routing::get(container_handlers::list_containers)
                .post(container_handlers::create_container),
        )
        .route(
            "/v1/containers/:id",
            axum::routing::put(container_handlers::update_container)
                .delete(container_handlers::delete_container),
        )
        .route(
            "/v1/containers/:id/manifest",
            axum::routing::post(container_handlers::upload_manifest),
        )
        .route(
            "/v1/containers/:id/export/result",
            axum::routing::get(export_handlers::export_result),
        )
        .route(
            "/v1/containers/:id/export/diff",
            axum::routing::get(export_handlers::export_diff),
        )
        .route(
            "/v1/scans",
            axum::routing::get(scan_handlers::list_scans).post(scan_handlers::submit_scan),
        )
        .route(
            "/v1/scans/:id",
            axum::routing::put(scan_handlers::correct_scan).delete(scan_handlers::delete_scan),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
