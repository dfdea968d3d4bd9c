//! Payment API 模块 (员工)

use axum::{Json, Router, extract::State, middleware, routing::patch};
use shared::request::PaymentRequest;
use shared::response::PaymentResponse;

use crate::auth::{StaffUser, require_staff};
use crate::core::ServerState;
use crate::utils::validation::{MAX_ID_LEN, validate_required_text};
use crate::utils::{AppResult, time};

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/payment", patch(set_paid))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff))
}

async fn set_paid(
    State(state): State<ServerState>,
    user: StaffUser,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<PaymentResponse>> {
    validate_required_text(&payload.id, "id", MAX_ID_LEN)?;
    let date_key = time::date_key(time::parse_date(&payload.date_key)?);

    let ticket = state
        .manager
        .set_paid(&date_key, &payload.id, payload.paid)?;
    tracing::info!(staff_id = %user.id, ticket_id = %ticket.id, paid = ticket.paid, "Payment flag set");

    Ok(Json(PaymentResponse {
        id: ticket.id,
        date_key: ticket.date_key,
        paid: ticket.paid,
    }))
}
