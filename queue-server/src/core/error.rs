use thiserror::Error;

use crate::auth::JwtError;
use crate::queue::QueueError;

/// 启动 / 运行期错误 (不经过 HTTP)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
