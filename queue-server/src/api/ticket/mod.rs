//! Ticket API 模块 (顾客自助修改 / 取消)

mod handler;

use axum::{Router, routing::patch};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/ticket",
        patch(handler::edit).delete(handler::delete),
    )
}
