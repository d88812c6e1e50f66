//! 集成测试公共设施：内存仓储、记录型通知、固定角色目录

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{PagedResult, Pagination, UserId};
use domain_core::{Currency, Entity};
use errors::{AppError, AppResult};
use ports::{ContextRef, FixedClock, Notifier, RoleDirectory, StaticActor};
use rust_decimal::Decimal;

use pm_ct::application::{ContractSettings, ServiceHandler};
use pm_ct::domain::entities::{Contract, ContractFilter, ContractTerms};
use pm_ct::domain::repositories::ContractRepository;
use pm_ct::domain::value_objects::ContractId;

pub const ASSIGNEE: &str = "alice@example.com";
pub const MANAGER: &str = "carol@example.com";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2025-06-15，多数用例的“今天”
pub fn today() -> NaiveDate {
    date(2025, 6, 15)
}

pub fn actor() -> StaticActor {
    StaticActor::new("bob@example.com")
}

/// 2025 全年、负责人 alice、金额 120000 CNY 的条款
pub fn terms(name: &str) -> ContractTerms {
    let mut terms = ContractTerms::new(name, date(2025, 1, 1), date(2025, 12, 31), Currency::cny());
    terms.assigned_to = Some(UserId::from(ASSIGNEE));
    terms.contract_value = Decimal::new(120_000, 0);
    terms
}

// ========== 内存仓储 ==========

#[derive(Default)]
pub struct InMemoryContractRepository {
    contracts: Mutex<Vec<Contract>>,
    failing_updates: Mutex<HashSet<ContractId>>,
    interleaved_writes: Mutex<HashSet<ContractId>>,
}

impl InMemoryContractRepository {
    pub fn get(&self, id: &ContractId) -> Option<Contract> {
        self.contracts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.contracts.lock().unwrap().len()
    }

    /// 之后对该合同的更新都会失败
    pub fn fail_updates_for(&self, id: ContractId) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    /// 下一次更新该合同前，模拟另一请求先提交了一次修改
    pub fn interleave_write_for(&self, id: ContractId) {
        self.interleaved_writes.lock().unwrap().insert(id);
    }

    fn check_update(&self, contracts: &mut [Contract], contract: &Contract) -> AppResult<usize> {
        if self.failing_updates.lock().unwrap().contains(contract.id()) {
            return Err(AppError::database("connection reset"));
        }
        let index = contracts
            .iter()
            .position(|c| c.id() == contract.id())
            .ok_or_else(|| AppError::not_found("Contract not found"))?;

        if self.interleaved_writes.lock().unwrap().remove(contract.id()) {
            contracts[index].touch(UserId::from("mallory@example.com"), chrono::Utc::now());
        }
        if contracts[index].row_version() != contract.row_version() - 1 {
            return Err(AppError::conflict("Contract was modified concurrently"));
        }
        Ok(index)
    }
}

#[async_trait]
impl ContractRepository for InMemoryContractRepository {
    async fn find_by_id(&self, id: &ContractId) -> AppResult<Option<Contract>> {
        Ok(self.get(id))
    }

    async fn insert(&self, contract: &Contract) -> AppResult<()> {
        let mut contracts = self.contracts.lock().unwrap();
        if contracts.iter().any(|c| c.id() == contract.id()) {
            return Err(AppError::conflict("Contract already exists"));
        }
        contracts.push(contract.clone());
        Ok(())
    }

    async fn update(&self, contract: &Contract) -> AppResult<()> {
        let mut contracts = self.contracts.lock().unwrap();
        let index = self.check_update(&mut contracts, contract)?;
        contracts[index] = contract.clone();
        Ok(())
    }

    async fn renew(&self, source: &Contract, renewal: &Contract) -> AppResult<()> {
        let mut contracts = self.contracts.lock().unwrap();
        if contracts.iter().any(|c| c.id() == renewal.id()) {
            return Err(AppError::conflict("Contract already exists"));
        }
        let index = self.check_update(&mut contracts, source)?;
        contracts[index] = source.clone();
        contracts.push(renewal.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &ContractFilter,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Contract>> {
        let matched: Vec<Contract> = self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();
        Ok(PagedResult::new(items, total, pagination))
    }

    async fn find_ids(&self, filter: &ContractFilter) -> AppResult<Vec<ContractId>> {
        Ok(self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.matches(c))
            .map(|c| *c.id())
            .collect())
    }
}

// ========== 通知 ==========

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub recipients: Vec<UserId>,
    pub subject: String,
    pub body: String,
    pub context: ContextRef,
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        recipients: &[UserId],
        subject: &str,
        body: &str,
        context: &ContextRef,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::external_service("SMTP unavailable"));
        }
        self.sent.lock().unwrap().push(SentNotification {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

// ========== 角色目录 ==========

pub struct StaticRoleDirectory {
    users: Vec<UserId>,
    fail: bool,
}

impl StaticRoleDirectory {
    pub fn with_users(users: &[&str]) -> Self {
        Self {
            users: users.iter().map(|u| UserId::from(*u)).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            users: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RoleDirectory for StaticRoleDirectory {
    async fn users_with_role(&self, role: &str) -> AppResult<Vec<UserId>> {
        if self.fail {
            return Err(AppError::database("role lookup failed"));
        }
        assert_eq!(role, "Contract Manager");
        Ok(self.users.clone())
    }
}

// ========== 组装 ==========

pub struct Harness {
    pub repo: Arc<InMemoryContractRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub roles: Arc<StaticRoleDirectory>,
    pub handler: ServiceHandler,
}

impl Harness {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_parts(
            today,
            Arc::new(RecordingNotifier::default()),
            Arc::new(StaticRoleDirectory::with_users(&[MANAGER, ASSIGNEE])),
        )
    }

    pub fn with_parts(
        today: NaiveDate,
        notifier: Arc<RecordingNotifier>,
        roles: Arc<StaticRoleDirectory>,
    ) -> Self {
        let repo = Arc::new(InMemoryContractRepository::default());
        let handler = build_handler(repo.clone(), notifier.clone(), roles.clone(), today);
        Self {
            repo,
            notifier,
            roles,
            handler,
        }
    }

    /// 共享仓储与通知，换一个日期
    pub fn on(&self, today: NaiveDate) -> ServiceHandler {
        build_handler(
            self.repo.clone(),
            self.notifier.clone(),
            self.roles.clone(),
            today,
        )
    }
}

fn build_handler(
    repo: Arc<InMemoryContractRepository>,
    notifier: Arc<RecordingNotifier>,
    roles: Arc<StaticRoleDirectory>,
    today: NaiveDate,
) -> ServiceHandler {
    ServiceHandler::new(
        repo,
        roles,
        notifier,
        Arc::new(FixedClock::on(today)),
        ContractSettings::default(),
    )
}
