use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_ledger_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mortgage_ledger::auth::TokenService;
use mortgage_ledger::config::AppConfig;
use mortgage_ledger::error::AppError;
use mortgage_ledger::storage::SqlStore;
use mortgage_ledger::telemetry;
use mortgage_ledger::LedgerState;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(SqlStore::connect(&config.database).await?);
    let tokens = Arc::new(TokenService::new(config.auth.secret_key()));
    let ledger = LedgerState::new(store.clone(), store, tokens);

    let app = with_ledger_routes(ledger)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mortgage ledger ready");

    axum::serve(listener, app).await?;
    Ok(())
}
