//! 到期与续签提醒规则

use chrono::NaiveDate;

use crate::domain::entities::Contract;
use crate::domain::enums::ContractStatus;

/// 提醒类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Expiry,
    Renewal,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Expiry => "expiry",
            NotificationKind::Renewal => "renewal",
        }
    }
}

/// 待发送的提醒
///
/// 收件人由应用层解析：负责人，以及 `notify_managers` 为真时的合同管理员角色成员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueNotification {
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
    pub notify_managers: bool,
}

/// 到期提醒
///
/// 合同处于生效或已审批状态，且剩余天数等于合同配置的提醒天数或命中里程碑天数时触发。
/// 两者同时命中也只提醒一次。
pub fn expiry_notification(
    contract: &Contract,
    today: NaiveDate,
    milestones: &[i64],
) -> Option<DueNotification> {
    let terms = contract.terms();
    if !terms.expiry_notification_enabled || !contract.status().is_in_force() {
        return None;
    }

    let days = contract.days_to_expiry(today);
    let at_threshold = terms.notification_days == Some(days);
    if !at_threshold && !milestones.contains(&days) {
        return None;
    }

    Some(DueNotification {
        kind: NotificationKind::Expiry,
        subject: format!("Contract Expiring Soon: {}", contract.contract_name()),
        body: format!(
            "The contract <b>{}</b> is expiring on {}. Please review and take necessary action.",
            contract.contract_name(),
            contract.end_date()
        ),
        notify_managers: true,
    })
}

/// 续签提醒，仅发给负责人
pub fn renewal_notification(contract: &Contract, today: NaiveDate) -> Option<DueNotification> {
    let terms = contract.terms();
    if !terms.auto_renew || contract.status() != ContractStatus::Active {
        return None;
    }
    if terms.renewal_notification_days != Some(contract.days_to_expiry(today)) {
        return None;
    }

    Some(DueNotification {
        kind: NotificationKind::Renewal,
        subject: format!("Contract Renewal Due: {}", contract.contract_name()),
        body: format!(
            "The contract <b>{}</b> is set for auto-renewal. Please review the renewal terms.",
            contract.contract_name()
        ),
        notify_managers: false,
    })
}
