//! Site settings endpoints.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use nonna_rues_core::{Setting, SettingValue};

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// One entry of a batch settings update.
#[derive(Debug, Deserialize)]
pub struct SettingUpdateRequest {
    pub key: String,
    #[serde(flatten)]
    pub value: SettingValue,
}

/// All settings, sorted for the admin form.
///
/// Seeds the defaults first when the collection is empty, so a fresh
/// deployment renders a fully populated form.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Setting>>> {
    if state.db().settings.count().await == 0 {
        let seeded = state.db().settings.init_defaults().await?;
        tracing::info!(seeded, "settings collection was empty, defaults seeded");
    }
    Ok(Json(state.db().settings.all().await))
}

/// Apply a batch of value updates. Unknown keys are reported, not applied.
#[instrument(skip(state, _auth, updates))]
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Json(updates): Json<Vec<SettingUpdateRequest>>,
) -> Result<Json<serde_json::Value>> {
    let mut updated = 0usize;
    let mut unknown = Vec::new();

    for entry in updates {
        match state
            .db()
            .settings
            .update_value(&entry.key, entry.value)
            .await?
        {
            Some(_) => updated += 1,
            None => unknown.push(entry.key),
        }
    }

    tracing::info!(updated, unknown = unknown.len(), "settings updated");
    Ok(Json(json!({ "updated": updated, "unknown": unknown })))
}

/// Seed any missing default settings.
#[instrument(skip(state, _auth))]
pub async fn init(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
) -> Result<Json<serde_json::Value>> {
    let inserted = state.db().settings.init_defaults().await?;
    Ok(Json(json!({ "inserted": inserted })))
}
