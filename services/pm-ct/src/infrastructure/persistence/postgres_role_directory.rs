//! PostgreSQL 角色目录实现

use async_trait::async_trait;
use common::UserId;
use errors::AppResult;
use ports::RoleDirectory;
use sqlx::PgPool;

use super::error_mapper::map_sqlx_error;

pub struct PostgresRoleDirectory {
    pool: PgPool,
}

impl PostgresRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PostgresRoleDirectory {
    async fn users_with_role(&self, role: &str) -> AppResult<Vec<UserId>> {
        let users: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT user_id FROM user_roles WHERE role = $1 ORDER BY user_id",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(users.into_iter().map(UserId::from).collect())
    }
}
