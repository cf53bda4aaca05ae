use axum::{extract::State, response::ErrorResponse};
use hyper::StatusCode;
use log::{debug, error};
use std::sync::Arc;

use crate::startup::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<StatusCode, ErrorResponse> {
    state.pricing.ping().await.map_err(|e| {
        error!("document store unreachable: {}", e);
        e
    })?;

    debug!("service and document store are up");
    Ok(StatusCode::OK)
}
