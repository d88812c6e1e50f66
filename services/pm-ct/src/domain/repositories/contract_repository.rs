//! 合同仓储接口

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use errors::AppResult;

use crate::domain::entities::{Contract, ContractFilter};
use crate::domain::value_objects::ContractId;

/// 合同仓储接口
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// 根据 ID 查找合同
    async fn find_by_id(&self, id: &ContractId) -> AppResult<Option<Contract>>;

    /// 保存合同（新建）
    async fn insert(&self, contract: &Contract) -> AppResult<()>;

    /// 更新合同
    ///
    /// 存储中的行版本必须等于 `contract.row_version() - 1`，
    /// 否则返回 `AppError::Conflict`
    async fn update(&self, contract: &Contract) -> AppResult<()>;

    /// 在同一事务中插入续签合同并更新原合同，全部成功或全部回滚
    async fn renew(&self, source: &Contract, renewal: &Contract) -> AppResult<()>;

    /// 分页查询
    async fn list(
        &self,
        filter: &ContractFilter,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Contract>>;

    /// 查询满足条件的全部合同 ID，供批处理逐条加载
    async fn find_ids(&self, filter: &ContractFilter) -> AppResult<Vec<ContractId>>;
}
