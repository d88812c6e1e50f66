//! Business logic handler

use std::sync::Arc;

use common::{PagedResult, UserId};
use config::ContractsConfig;
use domain_core::{Currency, Entity};
use errors::{AppError, AppResult};
use metrics::counter;
use ports::{Clock, ContextRef, CurrentActor, Notifier, RoleDirectory};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::advisory::Advisory;
use crate::domain::dashboard::ContractDashboard;
use crate::domain::entities::{Contract, ContractFilter};
use crate::domain::notifications::{DueNotification, expiry_notification, renewal_notification};
use crate::domain::repositories::ContractRepository;
use crate::domain::snapshot::Snapshot;
use crate::domain::value_objects::ContractId;

use super::commands::*;
use super::queries::*;

/// 通知关联的单据类型
const DOC_TYPE: &str = "Contract";

/// 合同业务参数
#[derive(Debug, Clone)]
pub struct ContractSettings {
    pub company_currency: Currency,
    pub manager_role: String,
    pub expiry_milestones: Vec<i64>,
}

impl From<&ContractsConfig> for ContractSettings {
    fn from(config: &ContractsConfig) -> Self {
        Self {
            company_currency: Currency::new(&config.company_currency),
            manager_role: config.manager_role.clone(),
            expiry_milestones: config.expiry_milestones.clone(),
        }
    }
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self::from(&ContractsConfig::default())
    }
}

/// 保存结果：合同及非阻断提示
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub contract: Contract,
    pub advisories: Vec<Advisory>,
}

/// 新增修订的结果
#[derive(Debug, Clone, Serialize)]
pub struct AmendmentResult {
    pub amendment_number: String,
    #[serde(flatten)]
    pub saved: SaveOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveKind {
    Insert,
    Update,
    /// 批处理刷新状态，不发送提醒
    SweepUpdate,
}

pub struct ServiceHandler {
    contract_repo: Arc<dyn ContractRepository>,
    role_directory: Arc<dyn RoleDirectory>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: ContractSettings,
}

impl ServiceHandler {
    pub fn new(
        contract_repo: Arc<dyn ContractRepository>,
        role_directory: Arc<dyn RoleDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: ContractSettings,
    ) -> Self {
        Self {
            contract_repo,
            role_directory,
            notifier,
            clock,
            settings,
        }
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn settings(&self) -> &ContractSettings {
        &self.settings
    }

    pub(crate) fn contract_repo(&self) -> &dyn ContractRepository {
        self.contract_repo.as_ref()
    }

    // ========== 合同维护 ==========

    /// 创建合同
    pub async fn create_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: CreateContractCommand,
    ) -> AppResult<SaveOutcome> {
        cmd.validate()?;
        info!(contract_name = %cmd.terms.contract_name, actor = %actor.id(), "Creating contract");

        let contract = Contract::new(cmd.terms, actor.id(), self.clock.now());
        let outcome = self.save(actor, contract, None, SaveKind::Insert).await?;

        info!(contract_id = %outcome.contract.id(), "Contract created");
        Ok(outcome)
    }

    /// 更新合同条款（仅草稿）
    pub async fn update_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: UpdateContractCommand,
    ) -> AppResult<SaveOutcome> {
        cmd.validate()?;

        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.replace_terms(cmd.terms)?;

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    /// 提交合同
    pub async fn submit_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: SubmitContractCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.submit()?;
        info!(contract_id = %cmd.contract_id, status = %contract.status(), "Contract submitted");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    /// 审批通过
    pub async fn approve_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: ApproveContractCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.approve(actor.id(), self.clock.today())?;
        info!(contract_id = %cmd.contract_id, approver = %actor.id(), "Contract approved");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    /// 审批驳回
    pub async fn reject_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: RejectContractCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.reject(cmd.comments)?;
        info!(contract_id = %cmd.contract_id, "Contract rejected");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    // ========== 合同操作 ==========

    /// 新增修订
    pub async fn create_amendment(
        &self,
        actor: &dyn CurrentActor,
        cmd: CreateAmendmentCommand,
    ) -> AppResult<AmendmentResult> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        let amendment_number = contract.amend(cmd.amendment, self.clock.today())?;

        let saved = self
            .save(actor, contract, Some(&before), SaveKind::Update)
            .await?;
        info!(
            contract_id = %cmd.contract_id,
            amendment_number = %amendment_number,
            version = %saved.contract.document_version(),
            "Amendment created"
        );

        Ok(AmendmentResult {
            amendment_number,
            saved,
        })
    }

    /// 续签，返回新合同 ID
    pub async fn renew_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: RenewContractCommand,
    ) -> AppResult<ContractId> {
        let (mut source, before) = self.load(&cmd.contract_id).await?;

        let mut renewal = source.renewal(actor.id(), self.clock.now())?;
        let renewal_id = *renewal.id();
        let renewal_advisories = self.prepare(actor, &mut renewal, None)?;

        source.mark_renewed(renewal_id);
        let source_advisories = self.prepare(actor, &mut source, Some(&before))?;

        self.contract_repo.renew(&source, &renewal).await?;

        self.after_persist(renewal, renewal_advisories, true).await;
        self.after_persist(source, source_advisories, true).await;

        counter!("contracts_renewed_total").increment(1);
        info!(
            contract_id = %cmd.contract_id,
            renewal_id = %renewal_id,
            "Renewed contract created"
        );
        Ok(renewal_id)
    }

    /// 终止合同
    pub async fn terminate_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: TerminateContractCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.terminate(&cmd.reason, actor.id(), self.clock.now())?;
        info!(contract_id = %cmd.contract_id, "Contract terminated");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    /// 暂停合同
    pub async fn put_on_hold(
        &self,
        actor: &dyn CurrentActor,
        cmd: PutOnHoldCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.put_on_hold(&cmd.reason, actor.id(), self.clock.now())?;
        info!(contract_id = %cmd.contract_id, "Contract put on hold");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    /// 恢复合同
    pub async fn resume_contract(
        &self,
        actor: &dyn CurrentActor,
        cmd: ResumeContractCommand,
    ) -> AppResult<SaveOutcome> {
        let (mut contract, before) = self.load(&cmd.contract_id).await?;
        contract.resume(actor.id(), self.clock.now())?;
        info!(contract_id = %cmd.contract_id, "Contract resumed");

        self.save(actor, contract, Some(&before), SaveKind::Update).await
    }

    // ========== 查询 ==========

    pub async fn get_contract(&self, query: GetContractQuery) -> AppResult<Contract> {
        self.load(&query.contract_id).await.map(|(contract, _)| contract)
    }

    pub async fn list_contracts(&self, query: ListContractsQuery) -> AppResult<PagedResult<Contract>> {
        let filter = ContractFilter {
            statuses: query.status.into_iter().collect(),
            ..Default::default()
        };
        self.contract_repo.list(&filter, &query.pagination).await
    }

    pub async fn get_dashboard(&self, query: GetDashboardQuery) -> AppResult<ContractDashboard> {
        let contract = self.get_contract(GetContractQuery {
            contract_id: query.contract_id,
        })
        .await?;
        Ok(ContractDashboard::for_contract(&contract, self.clock.today()))
    }

    // ========== 保存流程 ==========

    /// 加载合同并捕获保存前快照
    pub(crate) async fn load(&self, id: &ContractId) -> AppResult<(Contract, Snapshot)> {
        let contract = self
            .contract_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract {} not found", id)))?;
        let snapshot = Snapshot::capture(&contract);
        Ok((contract, snapshot))
    }

    /// 保存流程：校验与派生 → 状态刷新 → 逾期扫描 → 版本历史 → 持久化 → 提醒
    pub(crate) async fn save(
        &self,
        actor: &dyn CurrentActor,
        mut contract: Contract,
        before: Option<&Snapshot>,
        kind: SaveKind,
    ) -> AppResult<SaveOutcome> {
        let advisories = self.prepare(actor, &mut contract, before)?;

        match kind {
            SaveKind::Insert => self.contract_repo.insert(&contract).await?,
            SaveKind::Update | SaveKind::SweepUpdate => self.contract_repo.update(&contract).await?,
        }

        Ok(self
            .after_persist(contract, advisories, kind != SaveKind::SweepUpdate)
            .await)
    }

    /// 持久化前的流水线：校验派生、状态刷新、逾期标记、版本历史、审计
    fn prepare(
        &self,
        actor: &dyn CurrentActor,
        contract: &mut Contract,
        before: Option<&Snapshot>,
    ) -> AppResult<Vec<Advisory>> {
        let today = self.clock.today();
        let now = self.clock.now();
        let actor_id = actor.id();

        let advisories = contract.validate_and_derive(today, &self.settings.company_currency)?;

        if let Some(status) = contract.refresh_status(today) {
            info!(contract_id = %contract.id(), status = %status, "Contract status changed");
        }

        let flagged = contract.sweep_overdue(today);
        if flagged > 0 {
            info!(contract_id = %contract.id(), flagged, "Overdue schedule items flagged");
        }

        if let Some(before) = before {
            if contract.record_version(before, actor_id.clone(), now) {
                debug!(contract_id = %contract.id(), "Version history entry recorded");
            }
        }
        contract.touch(actor_id, now);

        Ok(advisories)
    }

    /// 持久化成功后：计数、记录提示、按需发送提醒
    async fn after_persist(
        &self,
        contract: Contract,
        advisories: Vec<Advisory>,
        notify: bool,
    ) -> SaveOutcome {
        counter!("contracts_saved_total").increment(1);

        for advisory in &advisories {
            warn!(contract_id = %contract.id(), code = advisory.code(), "{}", advisory);
        }

        if notify {
            let today = self.clock.today();
            if let Some(notification) =
                expiry_notification(&contract, today, &self.settings.expiry_milestones)
            {
                self.dispatch(&contract, notification).await;
            }
            if let Some(notification) = renewal_notification(&contract, today) {
                self.dispatch(&contract, notification).await;
            }
        }

        SaveOutcome {
            contract,
            advisories,
        }
    }

    // ========== 提醒 ==========

    /// 发送提醒，失败只记录日志
    pub(crate) async fn dispatch(&self, contract: &Contract, notification: DueNotification) {
        let recipients = self.resolve_recipients(contract, &notification).await;
        if recipients.is_empty() {
            debug!(
                contract_id = %contract.id(),
                kind = notification.kind.as_str(),
                "No recipients for notification"
            );
            return;
        }

        let context = ContextRef::new(DOC_TYPE, contract.id().to_string());
        match self
            .notifier
            .send(&recipients, &notification.subject, &notification.body, &context)
            .await
        {
            Ok(()) => {
                counter!("contract_notifications_total", "kind" => notification.kind.as_str())
                    .increment(1);
                info!(
                    contract_id = %contract.id(),
                    kind = notification.kind.as_str(),
                    recipients = recipients.len(),
                    "Notification sent"
                );
            }
            Err(e) => {
                warn!(
                    contract_id = %contract.id(),
                    kind = notification.kind.as_str(),
                    error = %e,
                    "Failed to send notification"
                );
            }
        }
    }

    /// 负责人在前，角色成员去重后追加
    async fn resolve_recipients(
        &self,
        contract: &Contract,
        notification: &DueNotification,
    ) -> Vec<UserId> {
        let mut recipients: Vec<UserId> = contract
            .assigned_to()
            .filter(|user| !user.is_blank())
            .cloned()
            .into_iter()
            .collect();

        if notification.notify_managers {
            match self
                .role_directory
                .users_with_role(&self.settings.manager_role)
                .await
            {
                Ok(users) => {
                    for user in users {
                        if !user.is_blank() && !recipients.contains(&user) {
                            recipients.push(user);
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        role = %self.settings.manager_role,
                        error = %e,
                        "Failed to resolve role members, notifying assignee only"
                    );
                }
            }
        }

        recipients
    }
}
