//! 请求与响应结构

use common::Pagination;
use serde::{Deserialize, Serialize};

use crate::application::{AmendmentResult, SaveOutcome};
use crate::domain::advisory::Advisory;
use crate::domain::entities::Contract;
use crate::domain::enums::ContractStatus;
use crate::domain::value_objects::ContractId;

/// 保存类操作的响应
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub contract: Contract,
    pub advisories: Vec<Advisory>,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            contract: outcome.contract,
            advisories: outcome.advisories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AmendmentResponse {
    pub amendment_number: String,
    pub contract: Contract,
    pub advisories: Vec<Advisory>,
}

impl From<AmendmentResult> for AmendmentResponse {
    fn from(result: AmendmentResult) -> Self {
        Self {
            amendment_number: result.amendment_number,
            contract: result.saved.contract,
            advisories: result.saved.advisories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub renewed_contract_id: ContractId,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Deserialize)]
pub struct ListContractsParams {
    pub status: Option<ContractStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListContractsParams {
    pub fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }
}
