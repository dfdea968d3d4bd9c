//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌验证
//! - [`StaffUser`] - 当前员工上下文
//! - [`require_staff`] - 员工路由中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService, StaffUser};
pub use middleware::require_staff;
