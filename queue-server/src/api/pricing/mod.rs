//! Pricing API 模块

use axum::{Json, Router, extract::State, middleware, routing::get, routing::post};
use shared::models::{Pricing, PricingUpdate};

use crate::auth::{StaffUser, require_staff};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new().route("/api/pricing", get(get_pricing));

    let write_routes = Router::new()
        .route("/api/pricing", post(update_pricing))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    read_routes.merge(write_routes)
}

async fn get_pricing(State(state): State<ServerState>) -> AppResult<Json<Pricing>> {
    Ok(Json(state.manager.pricing()?))
}

async fn update_pricing(
    State(state): State<ServerState>,
    user: StaffUser,
    Json(payload): Json<PricingUpdate>,
) -> AppResult<Json<Pricing>> {
    let pricing = state.manager.update_pricing(payload)?;
    tracing::info!(staff_id = %user.id, "Prices updated via API");
    Ok(Json(pricing))
}
