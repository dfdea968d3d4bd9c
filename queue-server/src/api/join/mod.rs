//! Join API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::IDEMPOTENCY_HEADER;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/join", post(handler::join))
}
