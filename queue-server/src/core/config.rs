use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};
use crate::queue::{JoinStockPolicy, QueueOptions};

/// 服务器配置 - 队列服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TIMEZONE | Asia/Kolkata | 业务时区 (dateKey 划分) |
/// | JOIN_STOCK_POLICY | clamp | 排队时库存不足的处理: clamp / reject |
/// | ENFORCE_SERVICE_WINDOW | false | 营业时段外拒绝排队 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | ENVIRONMENT | development | 运行环境 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]，日志变量 (LOG_LEVEL / LOG_JSON /
/// LOG_DIR) 在加载配置之前由 [`crate::setup_environment`] 读取。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/queue HTTP_PORT=8080 JOIN_STOCK_POLICY=reject cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放 queue.redb
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 业务时区
    pub timezone: Tz,
    pub join_policy: JoinStockPolicy,
    pub enforce_service_window: bool,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "production")?;
        Self::load(environment, jwt)
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景 (固定 JWT 密钥、临时目录)
    pub fn with_overrides(work_dir: impl Into<String>, jwt: JwtConfig) -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let mut config = Self::load(environment, jwt)?;
        config.work_dir = work_dir.into();
        Ok(config)
    }

    fn load(environment: String, jwt: JwtConfig) -> Result<Self> {
        let timezone = match std::env::var("TIMEZONE") {
            Ok(tz) => tz
                .parse::<Tz>()
                .map_err(|_| ServerError::Config(format!("Unknown TIMEZONE: {tz}")))?,
            Err(_) => chrono_tz::Asia::Kolkata,
        };

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone,
            join_policy: std::env::var("JOIN_STOCK_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            enforce_service_window: std::env::var("ENFORCE_SERVICE_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            jwt,
            environment,
        })
    }

    /// 队列行为开关
    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            join_policy: self.join_policy,
            enforce_service_window: self.enforce_service_window,
        }
    }
}
