//! config - 配置加载库
//!
//! 加载顺序：`default.toml` → `{APP_ENV}.toml` → `CLM_` 前缀环境变量（`__` 分隔层级）

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 健康检查端口，缺省为业务端口 + 1000
    pub health_port: Option<u16>,
}

impl ServerConfig {
    pub fn health_port(&self) -> u16 {
        self.health_port
            .unwrap_or_else(|| self.port.saturating_add(1000))
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 定时任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 扫描间隔（秒），默认每天一次
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    86_400
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// 合同业务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// 本位币
    #[serde(default = "default_company_currency")]
    pub company_currency: String,
    /// 接收到期提醒的角色
    #[serde(default = "default_manager_role")]
    pub manager_role: String,
    /// 固定的到期提醒节点（距到期天数）
    #[serde(default = "default_expiry_milestones")]
    pub expiry_milestones: Vec<i64>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_company_currency() -> String {
    "CNY".to_string()
}

fn default_manager_role() -> String {
    "Contract Manager".to_string()
}

fn default_expiry_milestones() -> Vec<i64> {
    vec![90, 60, 30, 7]
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            company_currency: default_company_currency(),
            manager_role: default_manager_role(),
            expiry_milestones: default_expiry_milestones(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub contracts: ContractsConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("CLM_").split("__"));

        Self::from_figment(figment)
    }

    /// 从已组装的 Figment 提取并校验配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.contracts.company_currency.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "contracts.company_currency must not be empty".to_string(),
            ));
        }
        if self.contracts.scheduler.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "contracts.scheduler.interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
