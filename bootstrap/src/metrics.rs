//! Metrics 模块
//!
//! 提供 Prometheus metrics 导出

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use errors::{AppError, AppResult};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Metrics 记录器
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// 安装全局 Prometheus recorder
    pub fn install() -> AppResult<Self> {
        let handle = telemetry::init_metrics().map_err(|e| AppError::internal(e.to_string()))?;
        Ok(Self { handle })
    }

    /// 获取 Prometheus 格式的 metrics
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录 HTTP 请求
pub fn record_http_request(method: &str, route: &str, status: u16, duration_ms: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_ms", &labels).record(duration_ms);
}

/// 记录每个请求的耗时与状态码的 axum 中间件
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64() * 1000.0;
    record_http_request(&method, &route, response.status().as_u16(), duration);
    response
}

/// 记录 PostgreSQL 连接池指标
pub fn record_postgres_pool_metrics(pool: &PgPool) {
    let size = pool.size() as f64;
    let idle = pool.num_idle() as f64;
    gauge!("postgres_pool_size").set(size);
    gauge!("postgres_pool_idle").set(idle);
    gauge!("postgres_pool_active").set(size - idle);
}

/// 连接池 Metrics 采集器
///
/// 定期采集 PostgreSQL 连接池状态
pub struct PoolMetricsCollector {
    pool: PgPool,
    interval: Duration,
}

impl PoolMetricsCollector {
    pub fn new(pool: PgPool, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// 启动后台采集任务，token 取消后退出
    pub fn start(self: Arc<Self>, token: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        record_postgres_pool_metrics(&self.pool);
                        debug!(
                            size = self.pool.size(),
                            idle = self.pool.num_idle(),
                            "Pool metrics collected"
                        );
                    }
                    _ = token.cancelled() => break,
                }
            }
        })
    }
}
