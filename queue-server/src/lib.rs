//! Queue Server - 咖啡馆虚拟排队服务
//!
//! # 架构概述
//!
//! - **队列** (`queue`): redb 存储、库存账本、事务引擎
//! - **推送** (`broadcast`): 按天的快照扇出 (SSE)
//! - **认证** (`auth`): 员工 JWT 验证
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! queue-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── broadcast/     # 实时推送
//! ├── queue/         # 存储、账本、事务引擎
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod core;
pub mod queue;
pub mod utils;

// Re-export 公共类型
pub use auth::{JwtService, StaffUser};
pub use broadcast::{QueueBroadcaster, Subscription};
pub use core::{Config, Server, ServerState, build_app};
pub use queue::{QueueManager, QueueOptions};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env 并初始化日志
///
/// 读取 LOG_LEVEL (默认 info)、LOG_JSON、LOG_DIR。
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_json = std::env::var("LOG_JSON").ok().and_then(|v| v.parse().ok());
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_json, log_dir.as_deref());
}
