//! 单据状态枚举

use serde::{Deserialize, Serialize};

/// 单据状态
///
/// 只有已提交的合同才参与日期驱动的状态流转
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
}

impl DocStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, DocStatus::Submitted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Draft => "Draft",
            DocStatus::Submitted => "Submitted",
        }
    }
}
