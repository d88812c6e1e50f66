//! 每日批处理调度

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::ServiceHandler;

pub struct ContractScheduler {
    handler: Arc<ServiceHandler>,
    interval: Duration,
}

impl ContractScheduler {
    pub fn new(handler: Arc<ServiceHandler>, interval: Duration) -> Self {
        Self { handler, interval }
    }

    /// 依次执行三项批处理，单项失败不影响其余各项
    pub async fn run_once(&self) {
        if let Err(e) = self.handler.update_contract_statuses().await {
            error!(error = %e, "Failed to update contract statuses");
        }
        if let Err(e) = self.handler.auto_renew_contracts().await {
            error!(error = %e, "Failed to auto-renew contracts");
        }
        if let Err(e) = self.handler.check_expiring_contracts().await {
            error!(error = %e, "Failed to check expiring contracts");
        }
    }

    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Contract scheduler started");
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_once().await,
                    _ = shutdown.cancelled() => {
                        info!("Contract scheduler received shutdown signal");
                        break;
                    }
                }
            }
            info!("Contract scheduler stopped");
        })
    }
}
