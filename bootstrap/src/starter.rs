//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use config::AppConfig;
use errors::{AppError, AppResult};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::health::{HealthChecker, HealthServer};
use crate::infrastructure::Infrastructure;
use crate::metrics::{MetricsRecorder, PoolMetricsCollector, track_http_metrics};
use crate::runtime::{init_runtime, spawn_shutdown_listener};

/// 运行 HTTP 服务
///
/// 所有服务的统一入口点：
/// 1. 加载配置并初始化日志
/// 2. 创建基础设施资源（数据库连接池、SMTP）
/// 3. 启动健康检查服务器与连接池 metrics 采集器
/// 4. 调用 `service_builder` 构建业务路由，后台任务应监听传入的 token
/// 5. 启动服务器，收到关闭信号后取消 token 并等待退出
///
/// # 示例
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     bootstrap::run("config", |infra, shutdown| async move {
///         let state = build_state(&infra).await?;
///         Ok(routes(state))
///     }).await
/// }
/// ```
pub async fn run<F, Fut>(config_dir: &str, service_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, CancellationToken) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics = MetricsRecorder::install()?;
    let infra = Infrastructure::from_config(config.clone()).await?;

    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone());

    let pool_collector = Arc::new(PoolMetricsCollector::new(
        infra.postgres_pool(),
        Duration::from_secs(15),
    ));
    let collector_handle = pool_collector.start(shutdown.clone());

    let health_checker = Arc::new(HealthChecker::new(infra.postgres_pool()));
    let health_server = HealthServer::new(health_checker, metrics, config.server.health_port());
    let health_token = shutdown.clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.serve(health_token).await {
            error!("Health server error: {}", e);
        }
    });

    let router = service_builder(infra, shutdown.clone())
        .await?
        .layer(axum::middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::internal(format!("Invalid server address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "HTTP server starting");

    let server_token = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await?;

    shutdown.cancel();
    let _ = health_handle.await;
    let _ = collector_handle.await;

    info!("Service stopped");

    Ok(())
}
