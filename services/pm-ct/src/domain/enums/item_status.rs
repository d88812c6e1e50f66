//! 明细行状态枚举

use serde::{Deserialize, Serialize};

/// 付款计划状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

/// 合同义务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ObligationStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Overdue,
}

/// 交付物状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliverableStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
    Delayed,
}

impl DeliverableStatus {
    /// 已结束的交付物不会再被标记为延期
    pub fn is_closed(&self) -> bool {
        matches!(self, DeliverableStatus::Completed | DeliverableStatus::Cancelled)
    }
}
