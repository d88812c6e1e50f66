//! 合同明细行：付款计划、义务、交付物、里程碑

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::enums::{DeliverableStatus, ObligationStatus, PaymentStatus};

/// 付款计划行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleItem {
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl PaymentScheduleItem {
    /// 到期未付则标记为逾期，返回是否发生变化
    pub fn mark_overdue(&mut self, today: NaiveDate) -> bool {
        if self.payment_status == PaymentStatus::Pending && self.due_date < today {
            self.payment_status = PaymentStatus::Overdue;
            return true;
        }
        false
    }
}

/// 合同义务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub description: String,
    #[serde(default)]
    pub responsible_party: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ObligationStatus,
}

impl Obligation {
    pub fn mark_overdue(&mut self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) if self.status == ObligationStatus::Pending && due < today => {
                self.status = ObligationStatus::Overdue;
                true
            }
            _ => false,
        }
    }
}

/// 交付物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DeliverableStatus,
}

impl Deliverable {
    /// 未完成且已过期的交付物标记为延期
    pub fn mark_delayed(&mut self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due)
                if !self.status.is_closed()
                    && self.status != DeliverableStatus::Delayed
                    && due < today =>
            {
                self.status = DeliverableStatus::Delayed;
                true
            }
            _ => false,
        }
    }
}

/// 里程碑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub achieved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payment_due_today_is_not_overdue() {
        let mut item = PaymentScheduleItem {
            description: "Installment".to_string(),
            amount: Decimal::new(500, 0),
            due_date: date(2025, 6, 15),
            payment_status: PaymentStatus::Pending,
        };
        assert!(!item.mark_overdue(date(2025, 6, 15)));
        assert!(item.mark_overdue(date(2025, 6, 16)));
        assert_eq!(item.payment_status, PaymentStatus::Overdue);
    }

    #[test]
    fn test_paid_payment_never_flips() {
        let mut item = PaymentScheduleItem {
            description: String::new(),
            amount: Decimal::new(500, 0),
            due_date: date(2025, 1, 1),
            payment_status: PaymentStatus::Paid,
        };
        assert!(!item.mark_overdue(date(2025, 6, 15)));
        assert_eq!(item.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_obligation_without_due_date_is_skipped() {
        let mut obligation = Obligation {
            description: "Quarterly report".to_string(),
            responsible_party: Some("Vendor".to_string()),
            due_date: None,
            status: ObligationStatus::Pending,
        };
        assert!(!obligation.mark_overdue(date(2030, 1, 1)));

        obligation.status = ObligationStatus::InProgress;
        obligation.due_date = Some(date(2025, 1, 1));
        assert!(!obligation.mark_overdue(date(2025, 6, 15)));
    }

    #[test]
    fn test_deliverable_delay_rules() {
        let mut deliverable = Deliverable {
            description: "Design doc".to_string(),
            due_date: Some(date(2025, 6, 1)),
            status: DeliverableStatus::InProgress,
        };
        assert!(deliverable.mark_delayed(date(2025, 6, 15)));
        assert!(!deliverable.mark_delayed(date(2025, 6, 15)));

        let mut cancelled = Deliverable {
            description: "Training".to_string(),
            due_date: Some(date(2025, 6, 1)),
            status: DeliverableStatus::Cancelled,
        };
        assert!(!cancelled.mark_delayed(date(2025, 6, 15)));
    }
}
