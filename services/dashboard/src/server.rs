use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use price_explorer::config::AppConfig;
use price_explorer::error::AppError;
use price_explorer::explorer::DatasetCache;
use price_explorer::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let sources = config.sources.resolve()?;
    let cache = DatasetCache::global();
    // Unreadable inputs stop startup; schema problems are reported per page.
    let warm = cache.snapshot(&sources)?;
    info!(
        listings = warm.listings.len(),
        boundaries = warm.boundaries.len(),
        model = warm.model.is_some(),
        "datasets loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        sources: Arc::new(sources),
        title: Arc::from(config.dashboard.title.as_str()),
        cache,
    };

    let app = dashboard_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "price explorer dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}
