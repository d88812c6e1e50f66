//! 基础设施资源管理
//!
//! 统一管理服务共享的基础设施资源

use std::sync::Arc;

use adapter_email::{EmailClient, EmailSender};
use adapter_postgres::{PostgresConfig, create_pool};
use common::{RetryConfig, with_retry};
use config::AppConfig;
use errors::AppResult;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

/// 基础设施资源容器
///
/// 由 bootstrap 统一初始化，克隆开销很小
#[derive(Clone)]
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    email_sender: Option<Arc<dyn EmailSender>>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        // PostgreSQL 连接池（必需，带重试）
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        // SMTP（可选）
        let email_sender = match &config.email {
            Some(email_config) => {
                info!(smtp_host = %email_config.smtp_host, "Email sender configured");
                Some(Arc::new(EmailClient::new(email_config.clone())) as Arc<dyn EmailSender>)
            }
            None => {
                info!("Email not configured, notifications will only be logged");
                None
            }
        };

        Ok(Self {
            config,
            postgres_pool,
            email_sender,
        })
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取邮件发送器（未配置 SMTP 时为 None）
    pub fn email_sender(&self) -> Option<Arc<dyn EmailSender>> {
        self.email_sender.clone()
    }
}
