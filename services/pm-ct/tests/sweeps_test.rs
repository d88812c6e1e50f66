//! 每日批处理测试

mod support;

use std::sync::Arc;
use std::time::Duration;

use common::UserId;
use domain_core::{AggregateRoot, Entity};
use rust_decimal_macros::dec;

use pm_ct::application::SweepSummary;
use pm_ct::application::commands::*;
use pm_ct::domain::entities::{ContractTerms, PaymentScheduleItem};
use pm_ct::domain::enums::{ContractStatus, PaymentStatus, RenewalPeriod};
use pm_ct::domain::value_objects::ContractId;
use pm_ct::infrastructure::ContractScheduler;
use tokio_util::sync::CancellationToken;

use support::*;

async fn submitted(harness: &Harness, terms: ContractTerms) -> ContractId {
    let outcome = harness
        .handler
        .create_contract(&actor(), CreateContractCommand { terms })
        .await
        .unwrap();
    let id = *outcome.contract.id();
    harness
        .handler
        .submit_contract(&actor(), SubmitContractCommand { contract_id: id })
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn test_update_statuses_expires_past_contracts() {
    let harness = Harness::new(today());
    let mut terms = terms("Office Lease");
    terms.payment_schedule = vec![PaymentScheduleItem {
        description: "Final".to_string(),
        amount: dec!(120000),
        due_date: date(2025, 12, 31),
        payment_status: PaymentStatus::Pending,
    }];
    let active = submitted(&harness, terms).await;
    let draft = *harness
        .handler
        .create_contract(&actor(), CreateContractCommand { terms: support::terms("Draft") })
        .await
        .unwrap()
        .contract
        .id();

    let next_year = harness.on(date(2026, 1, 2));
    let summary = next_year.update_contract_statuses().await.unwrap();

    assert_eq!(
        summary,
        SweepSummary {
            matched: 1,
            processed: 1,
            failed: 0
        }
    );

    let contract = harness.repo.get(&active).unwrap();
    assert_eq!(contract.status(), ContractStatus::Expired);
    assert_eq!(contract.payment_schedule()[0].payment_status, PaymentStatus::Overdue);

    let entry = contract.version_history().last().unwrap();
    assert_eq!(entry.actor.as_str(), "system");
    assert!(entry.change_summary.starts_with("status: Active → Expired"));

    assert_eq!(harness.repo.get(&draft).unwrap().status(), ContractStatus::Draft);
}

#[tokio::test]
async fn test_update_statuses_continues_after_failure() {
    let harness = Harness::new(today());
    let first = submitted(&harness, terms("First")).await;
    let second = submitted(&harness, terms("Second")).await;
    harness.repo.fail_updates_for(first);

    let next_year = harness.on(date(2026, 1, 2));
    let summary = next_year.update_contract_statuses().await.unwrap();

    assert_eq!(summary.matched, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(harness.repo.get(&first).unwrap().status(), ContractStatus::Active);
    assert_eq!(harness.repo.get(&second).unwrap().status(), ContractStatus::Expired);
}

#[tokio::test]
async fn test_update_statuses_does_not_notify() {
    let harness = Harness::new(date(2025, 1, 1));
    let mut terms = terms("Cleaning Services");
    terms.expiry_notification_enabled = true;
    terms.end_date = date(2025, 9, 13);
    submitted(&harness, terms).await;
    assert!(harness.notifier.sent().is_empty());

    // 2025-06-15 起 90 天后到期，命中固定节点
    let later = harness.on(date(2025, 6, 15));
    later.update_contract_statuses().await.unwrap();

    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_auto_renew_contracts_ending_today() {
    let harness = Harness::new(today());
    let mut terms = terms("Hosting");
    terms.auto_renew = true;
    terms.renewal_period = Some(RenewalPeriod::SixMonths);
    terms.end_date = date(2025, 6, 30);
    let due = submitted(&harness, terms.clone()).await;

    terms.end_date = date(2025, 7, 31);
    let not_due = submitted(&harness, terms).await;

    let on_end_date = harness.on(date(2025, 6, 30));
    let summary = on_end_date.auto_renew_contracts().await.unwrap();

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(harness.repo.count(), 3);

    let source = harness.repo.get(&due).unwrap();
    assert_eq!(source.status(), ContractStatus::Renewed);
    let renewal_id = source.related_contracts()[0].contract;
    let renewal = harness.repo.get(&renewal_id).unwrap();
    assert_eq!(renewal.start_date(), date(2025, 7, 1));
    assert_eq!(renewal.end_date(), date(2026, 1, 1));
    assert_eq!(renewal.audit_info().created_by, Some(UserId::system()));

    assert_eq!(harness.repo.get(&not_due).unwrap().status(), ContractStatus::Active);
}

#[tokio::test]
async fn test_auto_renew_failure_leaves_no_orphan_renewals() {
    let harness = Harness::new(today());
    let mut terms = terms("Hosting");
    terms.auto_renew = true;
    terms.renewal_period = Some(RenewalPeriod::OneYear);
    terms.end_date = date(2025, 6, 30);
    let due = submitted(&harness, terms).await;
    harness.repo.fail_updates_for(due);

    let on_end_date = harness.on(date(2025, 6, 30));
    for _ in 0..3 {
        let summary = on_end_date.auto_renew_contracts().await.unwrap();
        assert_eq!(
            summary,
            SweepSummary {
                matched: 1,
                processed: 0,
                failed: 1
            }
        );
    }

    assert_eq!(harness.repo.count(), 1);
    assert_eq!(harness.repo.get(&due).unwrap().status(), ContractStatus::Active);
}

#[tokio::test]
async fn test_check_expiring_contracts_sends_milestone_reminders() {
    let harness = Harness::new(date(2025, 1, 1));
    let mut terms = terms("Cleaning Services");
    terms.expiry_notification_enabled = true;
    terms.end_date = date(2025, 7, 15);
    let id = submitted(&harness, terms).await;
    assert!(harness.notifier.sent().is_empty());

    let thirty_days_before = harness.on(date(2025, 6, 15));
    let summary = thirty_days_before.check_expiring_contracts().await.unwrap();

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.processed, 1);

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Contract Expiring Soon: Cleaning Services");
    assert_eq!(sent[0].context.doc_id, id.to_string());

    // 非节点日不提醒，合同也不会被保存
    let before = harness.repo.get(&id).unwrap();
    harness
        .on(date(2025, 6, 16))
        .check_expiring_contracts()
        .await
        .unwrap();
    assert_eq!(harness.notifier.sent().len(), 1);
    assert_eq!(harness.repo.get(&id).unwrap().version_history(), before.version_history());
}

#[tokio::test]
async fn test_scheduler_run_once_updates_then_renews() {
    let harness = Harness::new(today());
    let mut terms = terms("Hosting");
    terms.auto_renew = true;
    terms.renewal_period = Some(RenewalPeriod::SixMonths);
    terms.end_date = date(2025, 6, 30);
    let due = submitted(&harness, terms).await;
    let stale = submitted(&harness, support::terms("Office Lease")).await;

    let scheduler = ContractScheduler::new(
        Arc::new(harness.on(date(2025, 6, 30))),
        Duration::from_secs(3600),
    );
    scheduler.run_once().await;

    assert_eq!(harness.repo.get(&due).unwrap().status(), ContractStatus::Renewed);
    assert_eq!(harness.repo.get(&stale).unwrap().status(), ContractStatus::Active);
    assert_eq!(harness.repo.count(), 3);
}

#[tokio::test]
async fn test_scheduler_stops_on_shutdown() {
    let harness = Harness::new(today());
    let scheduler = Arc::new(ContractScheduler::new(
        Arc::new(harness.handler),
        Duration::from_secs(3600),
    ));
    let token = CancellationToken::new();

    let handle = scheduler.start(token.clone());
    token.cancel();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
