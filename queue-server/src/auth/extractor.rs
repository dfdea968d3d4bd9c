//! Staff extractor
//!
//! Handlers behind [`require_staff`](super::require_staff) take a
//! [`StaffUser`] argument to learn who acted.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::StaffUser;
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StaffUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}
