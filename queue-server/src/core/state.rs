use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::broadcast::QueueBroadcaster;
use crate::core::{Config, Result};
use crate::queue::QueueManager;

/// 数据库文件名 (位于 work_dir 下)
const DB_FILE: &str = "queue.redb";

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | manager | Arc<QueueManager> | 队列事务引擎 |
/// | broadcaster | QueueBroadcaster | 按天的实时推送 |
/// | jwt_service | Arc<JwtService> | 员工令牌验证 |
/// | shutdown | CancellationToken | 关闭信号 (结束 SSE 流) |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub manager: Arc<QueueManager>,
    pub broadcaster: QueueBroadcaster,
    pub jwt_service: Arc<JwtService>,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 打开数据库 (work_dir/queue.redb)
    /// 3. 创建推送器与 JWT 服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = PathBuf::from(&config.work_dir).join(DB_FILE);

        let manager = Arc::new(QueueManager::new(
            &db_path,
            config.timezone,
            config.queue_options(),
        )?);
        tracing::info!(db = %db_path.display(), "Queue database opened");

        Ok(Self::with_manager(config.clone(), manager))
    }

    /// 使用已有的 QueueManager 构造
    pub fn with_manager(config: Config, manager: Arc<QueueManager>) -> Self {
        let broadcaster = QueueBroadcaster::new(manager.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            manager,
            broadcaster,
            jwt_service,
            shutdown: CancellationToken::new(),
        }
    }
}
