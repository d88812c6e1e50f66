//! 角色目录

use async_trait::async_trait;
use common::UserId;
use errors::AppResult;

/// 角色目录 trait
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// 查询拥有指定角色的所有用户
    async fn users_with_role(&self, role: &str) -> AppResult<Vec<UserId>>;
}
