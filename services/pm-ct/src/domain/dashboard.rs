//! 合同看板

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::entities::Contract;
use crate::domain::enums::{DeliverableStatus, ObligationStatus, PaymentStatus};

/// 合同看板数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDashboard {
    pub total_value: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub overdue_amount: Decimal,
    /// 交付物完成率（%）
    pub deliverables_completion: f64,
    /// 义务完成率（%）
    pub obligations_completion: f64,
    /// 里程碑达成率（%）
    pub milestone_achievement: f64,
    pub days_remaining: i64,
}

impl ContractDashboard {
    pub fn for_contract(contract: &Contract, today: NaiveDate) -> Self {
        let amount_with = |status: PaymentStatus| -> Decimal {
            contract
                .payment_schedule()
                .iter()
                .filter(|p| p.payment_status == status)
                .map(|p| p.amount)
                .sum()
        };

        let days_remaining = if contract.status().is_in_force() {
            contract.days_to_expiry(today).max(0)
        } else {
            0
        };

        Self {
            total_value: contract.terms().contract_value,
            paid_amount: amount_with(PaymentStatus::Paid),
            pending_amount: amount_with(PaymentStatus::Pending),
            overdue_amount: amount_with(PaymentStatus::Overdue),
            deliverables_completion: rate(
                contract.deliverables(),
                |d| d.status == DeliverableStatus::Completed,
            ),
            obligations_completion: rate(
                contract.obligations(),
                |o| o.status == ObligationStatus::Completed,
            ),
            milestone_achievement: rate(contract.milestones(), |m| m.achieved),
            days_remaining,
        }
    }
}

fn rate<T>(rows: &[T], done: impl Fn(&T) -> bool) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let completed = rows.iter().filter(|row| done(*row)).count();
    completed as f64 / rows.len() as f64 * 100.0
}
