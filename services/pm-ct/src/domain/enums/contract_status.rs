//! 合同状态枚举

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// 合同状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display)]
pub enum ContractStatus {
    /// 草稿
    #[default]
    Draft,
    /// 待审批
    #[serde(rename = "Pending Approval")]
    #[display("Pending Approval")]
    PendingApproval,
    /// 已审批
    Approved,
    /// 已驳回
    Rejected,
    /// 生效中
    Active,
    /// 暂停
    #[serde(rename = "On Hold")]
    #[display("On Hold")]
    OnHold,
    /// 已到期
    Expired,
    /// 已终止
    Terminated,
    /// 已续签
    Renewed,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 9] = [
        ContractStatus::Draft,
        ContractStatus::PendingApproval,
        ContractStatus::Approved,
        ContractStatus::Rejected,
        ContractStatus::Active,
        ContractStatus::OnHold,
        ContractStatus::Expired,
        ContractStatus::Terminated,
        ContractStatus::Renewed,
    ];

    /// 草稿单据允许持有的状态
    pub fn is_draft_state(&self) -> bool {
        matches!(
            self,
            ContractStatus::Draft
                | ContractStatus::PendingApproval
                | ContractStatus::Approved
                | ContractStatus::Rejected
        )
    }

    /// 是否处于履约期（生效或已审批）
    pub fn is_in_force(&self) -> bool {
        matches!(self, ContractStatus::Active | ContractStatus::Approved)
    }

    /// 是否可以修订
    pub fn can_amend(&self) -> bool {
        self.is_in_force()
    }

    /// 是否可以终止
    pub fn can_terminate(&self) -> bool {
        self.is_in_force()
    }

    /// 是否可以暂停
    pub fn can_hold(&self) -> bool {
        matches!(self, ContractStatus::Active)
    }

    /// 是否可以恢复
    pub fn can_resume(&self) -> bool {
        matches!(self, ContractStatus::OnHold)
    }

    /// 日期驱动的状态刷新不会覆盖的状态
    fn pinned_against_activation(&self) -> bool {
        matches!(
            self,
            ContractStatus::Terminated | ContractStatus::OnHold | ContractStatus::Renewed
        )
    }

    /// 在履约期内且已审批时是否应转为生效
    pub fn can_activate(&self) -> bool {
        !self.pinned_against_activation()
    }

    /// 过了结束日期后是否应转为到期
    pub fn can_expire(&self) -> bool {
        !matches!(self, ContractStatus::Terminated | ContractStatus::Renewed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "Draft",
            ContractStatus::PendingApproval => "Pending Approval",
            ContractStatus::Approved => "Approved",
            ContractStatus::Rejected => "Rejected",
            ContractStatus::Active => "Active",
            ContractStatus::OnHold => "On Hold",
            ContractStatus::Expired => "Expired",
            ContractStatus::Terminated => "Terminated",
            ContractStatus::Renewed => "Renewed",
        }
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown contract status: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_display_names() {
        for status in ContractStatus::ALL {
            assert_eq!(status.as_str().parse::<ContractStatus>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
        assert!("Paused".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&ContractStatus::OnHold).unwrap();
        assert_eq!(json, "\"On Hold\"");
        let status: ContractStatus = serde_json::from_str("\"Pending Approval\"").unwrap();
        assert_eq!(status, ContractStatus::PendingApproval);
    }

    #[test]
    fn test_refresh_guards() {
        assert!(!ContractStatus::OnHold.can_activate());
        assert!(!ContractStatus::Renewed.can_activate());
        assert!(ContractStatus::Expired.can_activate());
        assert!(ContractStatus::OnHold.can_expire());
        assert!(!ContractStatus::Terminated.can_expire());
    }
}
