//! 每日批处理：到期提醒、自动续签、状态刷新

use metrics::counter;
use ports::StaticActor;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::entities::ContractFilter;
use crate::domain::enums::ContractStatus;
use crate::domain::notifications::expiry_notification;
use crate::domain::value_objects::ContractId;
use errors::AppResult;

use super::commands::RenewContractCommand;
use super::handler::{SaveKind, ServiceHandler};

/// 批处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// 命中过滤条件的合同数
    pub matched: usize,
    /// 处理成功的合同数
    pub processed: usize,
    /// 处理失败的合同数
    pub failed: usize,
}

impl SweepSummary {
    fn record(&mut self, sweep: &'static str, id: &ContractId, result: AppResult<()>) {
        match result {
            Ok(()) => self.processed += 1,
            Err(e) => {
                self.failed += 1;
                counter!("contract_sweep_failures_total", "sweep" => sweep).increment(1);
                warn!(sweep, contract_id = %id, error = %e, "Sweep failed for contract");
            }
        }
    }
}

impl ServiceHandler {
    /// 检查生效中合同的到期提醒（不保存）
    pub async fn check_expiring_contracts(&self) -> AppResult<SweepSummary> {
        const SWEEP: &str = "check_expiring";

        let filter = ContractFilter::default()
            .submitted()
            .with_statuses(&[ContractStatus::Active, ContractStatus::Approved])
            .expiry_notification_enabled(true);
        let ids = self.contract_repo().find_ids(&filter).await?;

        let today = self.clock().today();
        let mut summary = SweepSummary {
            matched: ids.len(),
            ..Default::default()
        };

        for id in &ids {
            let result: AppResult<()> = async {
                let (contract, _) = self.load(id).await?;
                if let Some(notification) =
                    expiry_notification(&contract, today, &self.settings().expiry_milestones)
                {
                    self.dispatch(&contract, notification).await;
                }
                Ok(())
            }
            .await;
            summary.record(SWEEP, id, result);
        }

        info!(sweep = SWEEP, ?summary, "Sweep finished");
        Ok(summary)
    }

    /// 自动续签当天到期的合同
    pub async fn auto_renew_contracts(&self) -> AppResult<SweepSummary> {
        const SWEEP: &str = "auto_renew";

        let today = self.clock().today();
        let filter = ContractFilter::default()
            .submitted()
            .with_statuses(&[ContractStatus::Active])
            .auto_renew(true)
            .ending_on(today);
        let ids = self.contract_repo().find_ids(&filter).await?;

        let actor = StaticActor::system();
        let mut summary = SweepSummary {
            matched: ids.len(),
            ..Default::default()
        };

        for id in &ids {
            let result = self
                .renew_contract(&actor, RenewContractCommand { contract_id: *id })
                .await
                .map(|_| ());
            summary.record(SWEEP, id, result);
        }

        info!(sweep = SWEEP, ?summary, "Sweep finished");
        Ok(summary)
    }

    /// 刷新生效中合同的状态并执行逾期扫描
    pub async fn update_contract_statuses(&self) -> AppResult<SweepSummary> {
        const SWEEP: &str = "update_statuses";

        let filter = ContractFilter::default()
            .submitted()
            .with_statuses(&[ContractStatus::Active, ContractStatus::Approved]);
        let ids = self.contract_repo().find_ids(&filter).await?;

        let actor = StaticActor::system();
        let mut summary = SweepSummary {
            matched: ids.len(),
            ..Default::default()
        };

        for id in &ids {
            let result: AppResult<()> = async {
                let (contract, before) = self.load(id).await?;
                self.save(&actor, contract, Some(&before), SaveKind::SweepUpdate)
                    .await?;
                Ok(())
            }
            .await;
            summary.record(SWEEP, id, result);
        }

        info!(sweep = SWEEP, ?summary, "Sweep finished");
        Ok(summary)
    }
}
