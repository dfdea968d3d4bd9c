//! Queue API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/queue | GET | 某天的全部订单 | 无 |
//! | /api/queue | DELETE | 清空今天等待中的订单 | 员工 |
//! | /api/queue/stream | GET | SSE 实时快照 | 无 |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/queue", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stream", get(handler::stream));

    let staff_routes = Router::new()
        .route("/", delete(handler::clear_today))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    public_routes.merge(staff_routes)
}
