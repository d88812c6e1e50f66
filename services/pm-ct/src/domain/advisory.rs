//! 非阻断提示
//!
//! 保存时发现但不阻止持久化的问题，随保存结果一起返回给调用方

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

/// 保存提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Advisory {
    /// 生效日期晚于开始日期
    EffectiveDateAfterStart,
    /// 签署日期晚于开始日期
    SigningDateAfterStart,
    /// 付款计划合计与合同金额不一致
    PaymentScheduleMismatch {
        scheduled_total: Decimal,
        contract_value: Decimal,
    },
    /// 已达到最大续签次数
    RenewalLimitReached { renewal_count: u32, max_renewals: u32 },
}

impl Advisory {
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::EffectiveDateAfterStart => "effective_date_after_start",
            Advisory::SigningDateAfterStart => "signing_date_after_start",
            Advisory::PaymentScheduleMismatch { .. } => "payment_schedule_mismatch",
            Advisory::RenewalLimitReached { .. } => "renewal_limit_reached",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::EffectiveDateAfterStart => f.write_str("Effective Date is after Start Date"),
            Advisory::SigningDateAfterStart => f.write_str("Signing Date is after Start Date"),
            Advisory::PaymentScheduleMismatch {
                scheduled_total,
                contract_value,
            } => write!(
                f,
                "Total payment schedule amount ({}) does not match contract value ({})",
                scheduled_total, contract_value
            ),
            Advisory::RenewalLimitReached { .. } => {
                f.write_str("Contract has reached maximum number of renewals")
            }
        }
    }
}
