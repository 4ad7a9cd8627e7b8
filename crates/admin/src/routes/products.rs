//! Product management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use nonna_rues_core::{Product, ProductImage, ProductUpdate};

use crate::error::{ApiError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Create product request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub category: Option<String>,
}

/// Full catalog, inactive products included.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.db().products.list_all().await)
}

/// One product by id.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    state
        .db()
        .products
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
}

/// Create a product.
#[instrument(skip(state, _auth, request))]
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_owned()));
    }
    if request.price < Decimal::ZERO {
        return Err(ApiError::BadRequest("price cannot be negative".to_owned()));
    }

    let product = Product::new(
        request.title,
        request.description,
        request.price,
        request.images,
        request.category,
    );
    let created = state.db().products.create(product).await?;
    tracing::info!(id = %created.id, title = %created.title, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a partial update.
#[instrument(skip(state, _auth, update))]
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<Uuid>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    state
        .db()
        .products
        .update(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
}

/// Delete a product.
#[instrument(skip(state, _auth))]
pub async fn remove(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.db().products.delete(id).await? {
        tracing::info!(%id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("product {id}")))
    }
}
