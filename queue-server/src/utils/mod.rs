//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区 / dateKey 计算
//! - [`validation`] - 输入校验

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::AppError;

/// Application-level Result type
///
/// Used in HTTP handlers and application logic
pub type AppResult<T> = Result<T, AppError>;
