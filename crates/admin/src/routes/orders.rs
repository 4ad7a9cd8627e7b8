//! Order management endpoints. All require auth: orders carry customer
//! contact details.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use nonna_rues_core::{Order, OrderStatus};

use crate::error::{ApiError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// All orders, newest first.
#[instrument(skip(state, _auth))]
pub async fn list(State(state): State<AppState>, _auth: RequireAdminAuth) -> Json<Vec<Order>> {
    Json(state.db().orders.list().await)
}

/// One order by id.
#[instrument(skip(state, _auth))]
pub async fn show(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    state
        .db()
        .orders
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))
}

/// Change an order's fulfillment status.
#[instrument(skip(state, _auth))]
pub async fn update_status(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let updated = state
        .db()
        .orders
        .update_status(id, request.status)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;
    tracing::info!(%id, status = %updated.status, "order status changed");
    Ok(Json(updated))
}
