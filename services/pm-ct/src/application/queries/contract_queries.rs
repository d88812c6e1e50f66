//! Contract queries

use common::Pagination;

use crate::domain::enums::ContractStatus;
use crate::domain::value_objects::ContractId;

/// 查询单个合同
#[derive(Debug, Clone)]
pub struct GetContractQuery {
    pub contract_id: ContractId,
}

/// 合同列表查询
#[derive(Debug, Clone, Default)]
pub struct ListContractsQuery {
    pub status: Option<ContractStatus>,
    pub pagination: Pagination,
}

/// 合同看板查询
#[derive(Debug, Clone)]
pub struct GetDashboardQuery {
    pub contract_id: ContractId,
}
