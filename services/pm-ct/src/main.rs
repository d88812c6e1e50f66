//! PM Contract Service - 合同服务入口
//!
//! 使用 clm-bootstrap 统一启动模式

use std::sync::Arc;
use std::time::Duration;

use adapter_email::{EmailNotifier, EmailTemplate};
use adapter_postgres::run_migrations;
use bootstrap::{Infrastructure, run};
use ports::{Notifier, RoleDirectory, SystemClock};
use tracing::info;

use pm_ct::MIGRATOR;
use pm_ct::api;
use pm_ct::application::{ContractSettings, ServiceHandler};
use pm_ct::domain::repositories::ContractRepository;
use pm_ct::infrastructure::persistence::{PostgresContractRepository, PostgresRoleDirectory};
use pm_ct::infrastructure::{ContractScheduler, LoggingNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run("config", |infra: Infrastructure, shutdown| async move {
        let pool = infra.postgres_pool();
        let config = infra.config();

        run_migrations(&pool, &MIGRATOR).await?;

        // 组装 Repositories
        let contract_repo: Arc<dyn ContractRepository> =
            Arc::new(PostgresContractRepository::new(pool.clone()));
        let role_directory: Arc<dyn RoleDirectory> =
            Arc::new(PostgresRoleDirectory::new(pool.clone()));

        // 组装通知：未配置 SMTP 时只记录日志
        let notifier: Arc<dyn Notifier> = match infra.email_sender() {
            Some(sender) => Arc::new(EmailNotifier::new(sender, EmailTemplate::builtin()?)),
            None => {
                info!("Email not configured, notifications will be logged only");
                Arc::new(LoggingNotifier)
            }
        };

        let handler = Arc::new(ServiceHandler::new(
            contract_repo,
            role_directory,
            notifier,
            Arc::new(SystemClock),
            ContractSettings::from(&config.contracts),
        ));

        let scheduler_config = &config.contracts.scheduler;
        if scheduler_config.enabled {
            let scheduler = Arc::new(ContractScheduler::new(
                handler.clone(),
                Duration::from_secs(scheduler_config.interval_secs),
            ));
            scheduler.start(shutdown);
        }

        Ok(api::routes(handler))
    })
    .await
}
