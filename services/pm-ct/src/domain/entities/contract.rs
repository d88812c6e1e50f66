//! 合同聚合根

use chrono::{DateTime, Days, NaiveDate, Utc};
use common::{AuditInfo, UserId};
use domain_core::{AggregateRoot, Currency, Entity, Money};
use errors::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::advisory::Advisory;
use crate::domain::entities::records::{Amendment, Comment, RelatedContract, VersionEntry};
use crate::domain::entities::schedule::{Deliverable, Milestone, Obligation, PaymentScheduleItem};
use crate::domain::enums::{
    ApprovalStatus, ContractStatus, DocStatus, RelationshipType, RenewalPeriod,
};
use crate::domain::snapshot::{Snapshot, summarize_changes};
use crate::domain::value_objects::{ContractId, DocumentVersion};

/// 合同条款
///
/// 用户可编辑的全部字段。状态、版本、修订记录等由聚合根自身维护，不在此列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub contract_name: String,
    #[serde(default)]
    pub contract_type: Option<String>,
    /// 合同相对方
    #[serde(default)]
    pub party_name: Option<String>,
    /// 负责人（登录名，同时作为邮件地址）
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub description: Option<String>,

    // 日期
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub signing_date: Option<NaiveDate>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // 财务
    pub currency: Currency,
    #[serde(default)]
    pub contract_value: Decimal,
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub advance_payment_required: bool,
    #[serde(default)]
    pub advance_payment_percentage: Option<Decimal>,

    // 审批
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub approved_on: Option<NaiveDate>,
    #[serde(default)]
    pub approval_comments: Option<String>,

    // 续签
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub renewal_period: Option<RenewalPeriod>,
    /// 0 表示不限次数
    #[serde(default)]
    pub max_renewals: u32,
    #[serde(default)]
    pub renewal_notification_days: Option<i64>,
    #[serde(default)]
    pub master_agreement: Option<ContractId>,

    // 到期提醒
    #[serde(default)]
    pub expiry_notification_enabled: bool,
    #[serde(default)]
    pub notification_days: Option<i64>,

    // 明细
    #[serde(default)]
    pub payment_schedule: Vec<PaymentScheduleItem>,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub related_contracts: Vec<RelatedContract>,
}

impl ContractTerms {
    pub fn new(
        contract_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            contract_name: contract_name.into(),
            contract_type: None,
            party_name: None,
            assigned_to: None,
            description: None,
            effective_date: None,
            signing_date: None,
            start_date,
            end_date,
            currency,
            contract_value: Decimal::ZERO,
            exchange_rate: None,
            advance_payment_required: false,
            advance_payment_percentage: None,
            requires_approval: false,
            approval_status: ApprovalStatus::Pending,
            approved_by: None,
            approved_on: None,
            approval_comments: None,
            auto_renew: false,
            renewal_period: None,
            max_renewals: 0,
            renewal_notification_days: None,
            master_agreement: None,
            expiry_notification_enabled: false,
            notification_days: None,
            payment_schedule: Vec::new(),
            obligations: Vec::new(),
            deliverables: Vec::new(),
            milestones: Vec::new(),
            related_contracts: Vec::new(),
        }
    }
}

/// 修订请求
#[derive(Debug, Clone, Deserialize)]
pub struct AmendmentRequest {
    pub amendment_type: String,
    pub description: String,
    #[serde(default)]
    pub previous_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    /// 缺省为修订当天
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
}

/// 合同聚合根
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// 合同 ID
    id: ContractId,
    /// 条款
    #[serde(flatten)]
    terms: ContractTerms,
    /// 合同状态
    status: ContractStatus,
    /// 单据状态
    doc_status: DocStatus,
    /// 单据版本号
    document_version: DocumentVersion,
    /// 已续签次数
    renewal_count: u32,
    /// 合同期限（天），派生字段
    duration_days: i64,
    /// 本位币金额，派生字段
    contract_value_in_company_currency: Option<Money>,
    /// 修订记录
    amendments: Vec<Amendment>,
    /// 版本历史
    version_history: Vec<VersionEntry>,
    /// 时间线备注
    comments: Vec<Comment>,
    /// 审计信息
    audit_info: AuditInfo,
    /// 行版本，每次保存加一，用于乐观并发控制
    #[serde(default)]
    row_version: i64,
}

impl Contract {
    /// 创建草稿合同
    pub fn new(terms: ContractTerms, created_by: UserId, now: DateTime<Utc>) -> Self {
        let duration_days = (terms.end_date - terms.start_date).num_days();
        Self {
            id: ContractId::new(),
            terms,
            status: ContractStatus::Draft,
            doc_status: DocStatus::Draft,
            document_version: DocumentVersion::initial(),
            renewal_count: 0,
            duration_days,
            contract_value_in_company_currency: None,
            amendments: Vec::new(),
            version_history: Vec::new(),
            comments: Vec::new(),
            audit_info: AuditInfo::new(created_by, now),
            row_version: 0,
        }
    }

    // ========== Getters ==========

    pub fn terms(&self) -> &ContractTerms {
        &self.terms
    }

    pub fn contract_name(&self) -> &str {
        &self.terms.contract_name
    }

    pub fn start_date(&self) -> NaiveDate {
        self.terms.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.terms.end_date
    }

    pub fn assigned_to(&self) -> Option<&UserId> {
        self.terms.assigned_to.as_ref()
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn doc_status(&self) -> DocStatus {
        self.doc_status
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        self.terms.approval_status
    }

    pub fn document_version(&self) -> DocumentVersion {
        self.document_version
    }

    pub fn renewal_count(&self) -> u32 {
        self.renewal_count
    }

    pub fn duration_days(&self) -> i64 {
        self.duration_days
    }

    pub fn contract_value_in_company_currency(&self) -> Option<&Money> {
        self.contract_value_in_company_currency.as_ref()
    }

    pub fn payment_schedule(&self) -> &[PaymentScheduleItem] {
        &self.terms.payment_schedule
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.terms.obligations
    }

    pub fn deliverables(&self) -> &[Deliverable] {
        &self.terms.deliverables
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.terms.milestones
    }

    pub fn related_contracts(&self) -> &[RelatedContract] {
        &self.terms.related_contracts
    }

    pub fn amendments(&self) -> &[Amendment] {
        &self.amendments
    }

    pub fn row_version(&self) -> i64 {
        self.row_version
    }

    pub fn version_history(&self) -> &[VersionEntry] {
        &self.version_history
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// 距离结束日期的天数，已过期为负数
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.terms.end_date - today).num_days()
    }

    pub fn has_reached_renewal_limit(&self) -> bool {
        self.terms.max_renewals > 0 && self.renewal_count >= self.terms.max_renewals
    }

    // ========== 编辑 ==========

    /// 替换条款，仅草稿单据允许
    pub fn replace_terms(&mut self, terms: ContractTerms) -> AppResult<()> {
        if self.doc_status.is_submitted() {
            return Err(AppError::failed_precondition(
                "Submitted contracts can only be changed through amendments or lifecycle actions",
            ));
        }
        self.terms = terms;
        Ok(())
    }

    /// 记录修改人并推进行版本
    pub fn touch(&mut self, actor: UserId, now: DateTime<Utc>) {
        self.audit_info.touch(actor, now);
        self.row_version += 1;
    }

    // ========== 校验与派生字段 ==========

    /// 校验并重新计算派生字段
    ///
    /// 阻断性问题返回 `AppError::Validation`，其余问题作为提示返回
    pub fn validate_and_derive(
        &mut self,
        today: NaiveDate,
        company_currency: &Currency,
    ) -> AppResult<Vec<Advisory>> {
        let mut advisories = Vec::new();

        self.validate_dates(&mut advisories)?;
        self.validate_financial(&mut advisories)?;
        self.validate_approval(today)?;
        self.validate_renewal(&mut advisories)?;

        self.duration_days = (self.terms.end_date - self.terms.start_date).num_days();
        self.calculate_currency_values(company_currency);

        Ok(advisories)
    }

    fn validate_dates(&self, advisories: &mut Vec<Advisory>) -> AppResult<()> {
        let terms = &self.terms;
        if terms.end_date < terms.start_date {
            return Err(AppError::validation("End Date cannot be before Start Date"));
        }
        if terms.effective_date.is_some_and(|d| d > terms.start_date) {
            advisories.push(Advisory::EffectiveDateAfterStart);
        }
        if terms.signing_date.is_some_and(|d| d > terms.start_date) {
            advisories.push(Advisory::SigningDateAfterStart);
        }
        Ok(())
    }

    fn validate_financial(&self, advisories: &mut Vec<Advisory>) -> AppResult<()> {
        let terms = &self.terms;
        let value = Money::new(terms.contract_value, terms.currency.clone());

        if value.is_negative() {
            return Err(AppError::validation("Contract Value must be positive"));
        }

        if terms.exchange_rate.is_some_and(|rate| rate <= Decimal::ZERO) {
            return Err(AppError::validation("Exchange Rate must be greater than zero"));
        }

        if !terms.payment_schedule.is_empty() && !value.is_zero() {
            let scheduled_total: Decimal = terms.payment_schedule.iter().map(|p| p.amount).sum();
            if !value.approx_eq(scheduled_total) {
                advisories.push(Advisory::PaymentScheduleMismatch {
                    scheduled_total,
                    contract_value: terms.contract_value,
                });
            }
        }

        if terms.advance_payment_required {
            let out_of_range = terms
                .advance_payment_percentage
                .is_some_and(|p| !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&p));
            if out_of_range {
                return Err(AppError::validation(
                    "Advance Payment Percentage must be between 0 and 100",
                ));
            }
        }

        Ok(())
    }

    fn validate_approval(&mut self, today: NaiveDate) -> AppResult<()> {
        if !self.terms.requires_approval {
            return Ok(());
        }

        match self.terms.approval_status {
            ApprovalStatus::Approved => {
                if self.terms.approved_by.as_ref().is_none_or(UserId::is_blank) {
                    return Err(AppError::validation(
                        "Approved By is required when approval status is Approved",
                    ));
                }
                if self.terms.approved_on.is_none() {
                    self.terms.approved_on = Some(today);
                }
            }
            ApprovalStatus::Rejected => {
                if is_blank(self.terms.approval_comments.as_deref()) {
                    return Err(AppError::validation(
                        "Approval Comments are required when rejecting a contract",
                    ));
                }
            }
            ApprovalStatus::Pending => {}
        }
        Ok(())
    }

    fn validate_renewal(&self, advisories: &mut Vec<Advisory>) -> AppResult<()> {
        if !self.terms.auto_renew {
            return Ok(());
        }
        if self.terms.renewal_period.is_none() {
            return Err(AppError::validation(
                "Renewal Period is required when Auto Renew is enabled",
            ));
        }
        if self.has_reached_renewal_limit() {
            advisories.push(Advisory::RenewalLimitReached {
                renewal_count: self.renewal_count,
                max_renewals: self.terms.max_renewals,
            });
        }
        Ok(())
    }

    /// 本位币金额：有汇率时按汇率折算，同币种时直接取合同金额
    fn calculate_currency_values(&mut self, company_currency: &Currency) {
        let value = Money::new(self.terms.contract_value, self.terms.currency.clone());
        self.contract_value_in_company_currency = match self.terms.exchange_rate {
            Some(rate) => Some(value.convert(rate, company_currency.clone())),
            None if &self.terms.currency == company_currency => Some(value),
            None => None,
        };
    }

    // ========== 状态流转 ==========

    /// 根据日期和审批状态刷新合同状态，返回变化后的状态
    ///
    /// 草稿单据保持原状态不变。
    pub fn refresh_status(&mut self, today: NaiveDate) -> Option<ContractStatus> {
        let previous = self.status;

        if !self.doc_status.is_submitted() {
            if !self.status.is_draft_state() {
                debug!(
                    contract_id = %self.id,
                    status = %self.status,
                    "Draft contract holds a non-draft status, status left unchanged"
                );
            }
            return None;
        }

        let (start, end) = (self.terms.start_date, self.terms.end_date);
        if start <= today && today <= end {
            if self.status.can_activate() && self.terms.approval_status.is_approved() {
                self.status = ContractStatus::Active;
            }
        } else if today > end && self.status.can_expire() {
            self.status = ContractStatus::Expired;
        }

        (self.status != previous).then_some(self.status)
    }

    /// 逾期扫描，返回发生变化的行数
    ///
    /// 重复执行不会再改变已标记的行
    pub fn sweep_overdue(&mut self, today: NaiveDate) -> usize {
        let payments = self
            .terms
            .payment_schedule
            .iter_mut()
            .map(|p| p.mark_overdue(today))
            .filter(|changed| *changed)
            .count();
        let obligations = self
            .terms
            .obligations
            .iter_mut()
            .map(|o| o.mark_overdue(today))
            .filter(|changed| *changed)
            .count();
        let deliverables = self
            .terms
            .deliverables
            .iter_mut()
            .map(|d| d.mark_delayed(today))
            .filter(|changed| *changed)
            .count();
        payments + obligations + deliverables
    }

    /// 提交单据
    ///
    /// 不需要审批的合同在提交时视为已审批
    pub fn submit(&mut self) -> AppResult<()> {
        if self.doc_status.is_submitted() {
            return Err(AppError::failed_precondition(
                "Contract has already been submitted",
            ));
        }

        if !self.terms.requires_approval {
            self.terms.approval_status = ApprovalStatus::Approved;
        }

        self.doc_status = DocStatus::Submitted;
        self.status = if self.terms.approval_status.is_approved() {
            ContractStatus::Approved
        } else {
            ContractStatus::PendingApproval
        };
        Ok(())
    }

    /// 审批通过
    pub fn approve(&mut self, approver: UserId, today: NaiveDate) -> AppResult<()> {
        self.ensure_pending_approval("approved")?;

        self.terms.approval_status = ApprovalStatus::Approved;
        self.terms.approved_by = Some(approver);
        self.terms.approved_on = Some(today);
        self.status = ContractStatus::Approved;
        Ok(())
    }

    /// 审批驳回
    pub fn reject(&mut self, comments: impl Into<String>) -> AppResult<()> {
        self.ensure_pending_approval("rejected")?;

        let comments = comments.into();
        if is_blank(Some(&comments)) {
            return Err(AppError::validation(
                "Approval Comments are required when rejecting a contract",
            ));
        }

        self.terms.approval_status = ApprovalStatus::Rejected;
        self.terms.approval_comments = Some(comments);
        self.status = ContractStatus::Rejected;
        Ok(())
    }

    fn ensure_pending_approval(&self, action: &str) -> AppResult<()> {
        if !self.doc_status.is_submitted() || self.status != ContractStatus::PendingApproval {
            return Err(AppError::failed_precondition(format!(
                "Only contracts pending approval can be {}",
                action
            )));
        }
        Ok(())
    }

    /// 新增修订，返回修订编号
    pub fn amend(&mut self, request: AmendmentRequest, today: NaiveDate) -> AppResult<String> {
        if !self.status.can_amend() {
            return Err(AppError::failed_precondition(
                "Only Active or Approved contracts can be amended",
            ));
        }
        if is_blank(Some(&request.amendment_type)) {
            return Err(AppError::validation("Amendment Type is required"));
        }
        if is_blank(Some(&request.description)) {
            return Err(AppError::validation("Amendment Description is required"));
        }

        let amendment_number = format!("AMD-{:03}", self.amendments.len() + 1);
        self.amendments.push(Amendment {
            amendment_number: amendment_number.clone(),
            amendment_date: today,
            amendment_type: request.amendment_type,
            description: request.description,
            previous_value: request.previous_value,
            new_value: request.new_value,
            effective_from: request.effective_from.unwrap_or(today),
        });
        self.document_version = self.document_version.next();

        Ok(amendment_number)
    }

    /// 终止合同
    pub fn terminate(&mut self, reason: &str, actor: UserId, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_terminate() {
            return Err(AppError::failed_precondition(
                "Only Active or Approved contracts can be terminated",
            ));
        }
        if is_blank(Some(reason)) {
            return Err(AppError::validation("Termination reason is required"));
        }

        self.status = ContractStatus::Terminated;
        self.add_comment(format!("Contract terminated. Reason: {}", reason.trim()), actor, now);
        Ok(())
    }

    /// 暂停合同
    pub fn put_on_hold(&mut self, reason: &str, actor: UserId, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_hold() {
            return Err(AppError::failed_precondition(
                "Only Active contracts can be put on hold",
            ));
        }
        if is_blank(Some(reason)) {
            return Err(AppError::validation("Hold reason is required"));
        }

        self.status = ContractStatus::OnHold;
        self.add_comment(format!("Contract put on hold. Reason: {}", reason.trim()), actor, now);
        Ok(())
    }

    /// 恢复暂停的合同
    pub fn resume(&mut self, actor: UserId, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_resume() {
            return Err(AppError::failed_precondition(
                "Only contracts on hold can be resumed",
            ));
        }

        self.status = ContractStatus::Active;
        self.add_comment("Contract resumed from hold", actor, now);
        Ok(())
    }

    fn add_comment(&mut self, text: impl Into<String>, actor: UserId, now: DateTime<Utc>) {
        self.comments.push(Comment {
            timestamp: now,
            actor,
            text: text.into(),
        });
    }

    // ========== 续签 ==========

    /// 生成续签合同（草稿），不修改当前合同
    pub fn renewal(&self, created_by: UserId, now: DateTime<Utc>) -> AppResult<Contract> {
        match self.status {
            ContractStatus::Renewed => {
                return Err(AppError::conflict(format!(
                    "Contract {} has already been renewed",
                    self.id
                )));
            }
            ContractStatus::Terminated => {
                return Err(AppError::failed_precondition(
                    "Terminated contracts cannot be renewed",
                ));
            }
            _ => {}
        }
        if !self.terms.auto_renew {
            return Err(AppError::failed_precondition(
                "This contract is not set for auto-renewal",
            ));
        }
        if self.has_reached_renewal_limit() {
            return Err(AppError::failed_precondition(
                "Contract has reached maximum number of renewals",
            ));
        }

        let period = self.terms.renewal_period.unwrap_or_default();
        let start_date = self
            .terms
            .end_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::validation("Renewal start date is out of range"))?;
        let end_date = period
            .add_to(start_date)
            .ok_or_else(|| AppError::validation("Renewal end date is out of range"))?;

        let mut terms = self.terms.clone();
        terms.start_date = start_date;
        terms.end_date = end_date;
        terms.approval_status = ApprovalStatus::Pending;
        terms.approved_by = None;
        terms.approved_on = None;
        terms.approval_comments = None;
        terms.master_agreement = Some(self.terms.master_agreement.unwrap_or(self.id));
        terms.related_contracts.clear();

        let mut renewed = Contract::new(terms, created_by, now);
        renewed.renewal_count = self.renewal_count + 1;
        Ok(renewed)
    }

    /// 标记为已续签并关联新合同
    pub fn mark_renewed(&mut self, renewal_id: ContractId) {
        self.status = ContractStatus::Renewed;
        self.terms.related_contracts.push(RelatedContract {
            contract: renewal_id,
            relationship_type: RelationshipType::Renewal,
            description: Some(format!("Renewed from {}", self.terms.contract_name)),
        });
    }

    // ========== 版本历史 ==========

    /// 与保存前快照比较，有差异时追加一条版本历史
    pub fn record_version(&mut self, before: &Snapshot, actor: UserId, now: DateTime<Utc>) -> bool {
        let changes = before.diff(&Snapshot::capture(self));
        if changes.is_empty() {
            return false;
        }

        self.version_history.push(VersionEntry {
            version_number: self.document_version,
            timestamp: now,
            actor,
            change_summary: summarize_changes(&changes),
        });
        true
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl Entity for Contract {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Contract {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

/// 合同查询过滤条件
#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    /// 状态（为空时不过滤）
    pub statuses: Vec<ContractStatus>,
    pub doc_status: Option<DocStatus>,
    pub auto_renew: Option<bool>,
    pub expiry_notification_enabled: Option<bool>,
    pub end_date: Option<NaiveDate>,
}

impl ContractFilter {
    pub fn with_statuses(mut self, statuses: &[ContractStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn submitted(mut self) -> Self {
        self.doc_status = Some(DocStatus::Submitted);
        self
    }

    pub fn auto_renew(mut self, value: bool) -> Self {
        self.auto_renew = Some(value);
        self
    }

    pub fn expiry_notification_enabled(mut self, value: bool) -> Self {
        self.expiry_notification_enabled = Some(value);
        self
    }

    pub fn ending_on(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// 内存中判断合同是否满足条件
    pub fn matches(&self, contract: &Contract) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&contract.status))
            && self.doc_status.is_none_or(|s| s == contract.doc_status)
            && self.auto_renew.is_none_or(|v| v == contract.terms.auto_renew)
            && self
                .expiry_notification_enabled
                .is_none_or(|v| v == contract.terms.expiry_notification_enabled)
            && self.end_date.is_none_or(|d| d == contract.terms.end_date)
    }
}
