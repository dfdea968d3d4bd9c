//! Ready API 模块 (员工)

mod handler;

use axum::{Router, middleware, routing::patch};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/ready", patch(handler::mark_ready))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff))
}
