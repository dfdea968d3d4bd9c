//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`join`] - 顾客排队
//! - [`ticket`] - 顾客修改 / 取消订单
//! - [`position`] - 排队位置查询
//! - [`ready`] - 出餐 (员工)
//! - [`payment`] - 收款标记 (员工)
//! - [`queue`] - 队列列表、清空、实时推送
//! - [`settings`] - 营业设置与库存
//! - [`pricing`] - 价格

pub mod health;
pub mod join;
pub mod payment;
pub mod position;
pub mod pricing;
pub mod queue;
pub mod ready;
pub mod settings;
pub mod ticket;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
