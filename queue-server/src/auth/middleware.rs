//! 认证中间件
//!
//! 为员工操作提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{JwtError, JwtService, StaffUser};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 员工中间件 - 要求有效的员工令牌
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，校验角色后将
/// [`StaffUser`] 注入请求扩展。只挂在员工路由上，公共路由不经过它。
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
/// | 非员工角色 | 403 Forbidden |
pub async fn require_staff(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let user = match state.jwt_service.validate_token(token) {
        Ok(claims) => StaffUser::from(claims),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            return match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    if !user.is_staff() {
        security_log!(
            "WARN",
            "staff_required",
            user_id = user.id.clone(),
            user_role = user.role.clone(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::forbidden("Staff role required"));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
