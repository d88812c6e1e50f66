//! Contract commands

use errors::{AppError, AppResult};

use crate::domain::entities::{AmendmentRequest, ContractTerms};
use crate::domain::value_objects::ContractId;

/// 合同名称最大长度
const MAX_NAME_LEN: usize = 140;

fn validate_terms(terms: &ContractTerms) -> AppResult<()> {
    let name = terms.contract_name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Contract Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Contract Name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    if terms.currency.code().is_empty() {
        return Err(AppError::validation("Currency is required"));
    }
    Ok(())
}

/// 创建合同命令
#[derive(Debug, Clone)]
pub struct CreateContractCommand {
    pub terms: ContractTerms,
}

impl CreateContractCommand {
    pub fn validate(&self) -> AppResult<()> {
        validate_terms(&self.terms)
    }
}

/// 更新合同命令（整单保存）
#[derive(Debug, Clone)]
pub struct UpdateContractCommand {
    pub contract_id: ContractId,
    pub terms: ContractTerms,
}

impl UpdateContractCommand {
    pub fn validate(&self) -> AppResult<()> {
        validate_terms(&self.terms)
    }
}

/// 提交合同命令
#[derive(Debug, Clone)]
pub struct SubmitContractCommand {
    pub contract_id: ContractId,
}

/// 审批通过命令
#[derive(Debug, Clone)]
pub struct ApproveContractCommand {
    pub contract_id: ContractId,
}

/// 审批驳回命令
#[derive(Debug, Clone)]
pub struct RejectContractCommand {
    pub contract_id: ContractId,
    pub comments: String,
}

/// 新增修订命令
#[derive(Debug, Clone)]
pub struct CreateAmendmentCommand {
    pub contract_id: ContractId,
    pub amendment: AmendmentRequest,
}

/// 续签命令
#[derive(Debug, Clone)]
pub struct RenewContractCommand {
    pub contract_id: ContractId,
}

/// 终止命令
#[derive(Debug, Clone)]
pub struct TerminateContractCommand {
    pub contract_id: ContractId,
    pub reason: String,
}

/// 暂停命令
#[derive(Debug, Clone)]
pub struct PutOnHoldCommand {
    pub contract_id: ContractId,
    pub reason: String,
}

/// 恢复命令
#[derive(Debug, Clone)]
pub struct ResumeContractCommand {
    pub contract_id: ContractId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain_core::Currency;

    fn terms(name: &str) -> ContractTerms {
        ContractTerms::new(
            name,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            Currency::cny(),
        )
    }

    #[test]
    fn test_name_is_required() {
        let cmd = CreateContractCommand { terms: terms("  ") };
        assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));

        let cmd = CreateContractCommand {
            terms: terms(&"x".repeat(141)),
        };
        assert!(cmd.validate().is_err());

        let cmd = CreateContractCommand {
            terms: terms("Office Lease"),
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_currency_is_required() {
        let mut terms = terms("Office Lease");
        terms.currency = Currency::new("   ");
        let cmd = UpdateContractCommand {
            contract_id: ContractId::new(),
            terms,
        };
        assert!(cmd.validate().is_err());
    }
}
