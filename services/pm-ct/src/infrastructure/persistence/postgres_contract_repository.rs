//! PostgreSQL 合同仓储实现
//!
//! 聚合整体以 JSONB 存储，过滤用到的字段冗余为独立列并建索引

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use domain_core::{AggregateRoot, Entity};
use errors::{AppError, AppResult};
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::error_mapper::map_sqlx_error;
use crate::domain::entities::{Contract, ContractFilter};
use crate::domain::repositories::ContractRepository;
use crate::domain::value_objects::ContractId;

pub struct PostgresContractRepository {
    pool: PgPool,
}

impl PostgresContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 追加过滤条件（调用前已写入 `WHERE TRUE`）
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContractFilter) {
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        builder.push(" AND status = ANY(");
        builder.push_bind(statuses);
        builder.push(")");
    }
    if let Some(doc_status) = filter.doc_status {
        builder.push(" AND doc_status = ");
        builder.push_bind(doc_status.as_str());
    }
    if let Some(auto_renew) = filter.auto_renew {
        builder.push(" AND auto_renew = ");
        builder.push_bind(auto_renew);
    }
    if let Some(enabled) = filter.expiry_notification_enabled {
        builder.push(" AND expiry_notification_enabled = ");
        builder.push_bind(enabled);
    }
    if let Some(end_date) = filter.end_date {
        builder.push(" AND end_date = ");
        builder.push_bind(end_date);
    }
}

async fn insert_row<'e, E>(executor: E, contract: &Contract) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    let terms = contract.terms();
    let audit = contract.audit_info();

    sqlx::query(
        r#"
        INSERT INTO contracts (
            id, contract_name, status, doc_status, auto_renew,
            expiry_notification_enabled, end_date, document, row_version,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(contract.id().0)
    .bind(contract.contract_name())
    .bind(contract.status().as_str())
    .bind(contract.doc_status().as_str())
    .bind(terms.auto_renew)
    .bind(terms.expiry_notification_enabled)
    .bind(terms.end_date)
    .bind(Json(contract))
    .bind(contract.row_version())
    .bind(audit.created_at)
    .bind(audit.updated_at)
    .execute(executor)
    .await
    .map_err(map_sqlx_error)?;

    debug!(contract_id = %contract.id(), "Contract inserted");
    Ok(())
}

/// 按行版本比较并更新，返回受影响行数
async fn update_row<'e, E>(executor: E, contract: &Contract) -> AppResult<u64>
where
    E: Executor<'e, Database = Postgres>,
{
    let terms = contract.terms();

    let result = sqlx::query(
        r#"
        UPDATE contracts
        SET contract_name = $2, status = $3, doc_status = $4, auto_renew = $5,
            expiry_notification_enabled = $6, end_date = $7, document = $8,
            row_version = $9, updated_at = $10
        WHERE id = $1 AND row_version = $9 - 1
        "#,
    )
    .bind(contract.id().0)
    .bind(contract.contract_name())
    .bind(contract.status().as_str())
    .bind(contract.doc_status().as_str())
    .bind(terms.auto_renew)
    .bind(terms.expiry_notification_enabled)
    .bind(terms.end_date)
    .bind(Json(contract))
    .bind(contract.row_version())
    .bind(contract.audit_info().updated_at)
    .execute(executor)
    .await
    .map_err(map_sqlx_error)?;

    Ok(result.rows_affected())
}

impl PostgresContractRepository {
    /// 更新未命中时区分合同不存在与并发修改
    async fn stale_update_error(&self, contract: &Contract) -> AppError {
        let exists: Result<bool, sqlx::Error> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contracts WHERE id = $1)")
                .bind(contract.id().0)
                .fetch_one(&self.pool)
                .await;

        match exists {
            Ok(true) => AppError::conflict(format!(
                "Contract {} was modified concurrently, reload and retry",
                contract.id()
            )),
            Ok(false) => AppError::not_found(format!("Contract {} not found", contract.id())),
            Err(e) => map_sqlx_error(e),
        }
    }
}

#[async_trait]
impl ContractRepository for PostgresContractRepository {
    async fn find_by_id(&self, id: &ContractId) -> AppResult<Option<Contract>> {
        let document: Option<Json<Contract>> =
            sqlx::query_scalar("SELECT document FROM contracts WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(document.map(|Json(contract)| contract))
    }

    async fn insert(&self, contract: &Contract) -> AppResult<()> {
        insert_row(&self.pool, contract).await
    }

    async fn update(&self, contract: &Contract) -> AppResult<()> {
        if update_row(&self.pool, contract).await? == 0 {
            return Err(self.stale_update_error(contract).await);
        }
        Ok(())
    }

    async fn renew(&self, source: &Contract, renewal: &Contract) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        insert_row(&mut *tx, renewal).await?;
        if update_row(&mut *tx, source).await? == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(self.stale_update_error(source).await);
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(
            contract_id = %source.id(),
            renewal_id = %renewal.id(),
            "Renewal committed"
        );
        Ok(())
    }

    async fn list(
        &self,
        filter: &ContractFilter,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Contract>> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM contracts WHERE TRUE");
        push_filter(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut query_builder = QueryBuilder::new("SELECT document FROM contracts WHERE TRUE");
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(i64::from(pagination.page_size));
        query_builder.push(" OFFSET ");
        query_builder.push_bind(i64::from(pagination.offset()));

        let documents: Vec<Json<Contract>> = query_builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let items = documents.into_iter().map(|Json(c)| c).collect();
        Ok(PagedResult::new(items, total.max(0) as u64, pagination))
    }

    async fn find_ids(&self, filter: &ContractFilter) -> AppResult<Vec<ContractId>> {
        let mut builder = QueryBuilder::new("SELECT id FROM contracts WHERE TRUE");
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY end_date, id");

        let ids: Vec<Uuid> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(ids.into_iter().map(ContractId::from_uuid).collect())
    }
}
