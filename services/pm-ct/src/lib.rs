//! pm-ct - 合同生命周期服务
//!
//! 合同校验与派生、状态流转、逾期扫描、到期与续签提醒、版本历史，
//! 以及修订、续签、终止、暂停与恢复操作和每日批处理。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

use sqlx::migrate::Migrator;

/// 服务内嵌的数据库迁移
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
