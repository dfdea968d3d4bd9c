//! Settings API 模块
//!
//! GET 公开 (顾客端需要营业时段和库存)，POST 仅员工。

use axum::{Json, Router, extract::State, middleware, routing::get, routing::post};
use shared::models::{Settings, SettingsUpdate};

use crate::auth::{StaffUser, require_staff};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new().route("/api/settings", get(get_settings));

    let write_routes = Router::new()
        .route("/api/settings", post(update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    read_routes.merge(write_routes)
}

async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<Settings>> {
    Ok(Json(state.manager.settings()?))
}

/// Merge a partial update over the stored settings
async fn update_settings(
    State(state): State<ServerState>,
    user: StaffUser,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<Settings>> {
    let settings = state.manager.update_settings(payload)?;
    tracing::info!(staff_id = %user.id, "Settings updated via API");
    Ok(Json(settings))
}
