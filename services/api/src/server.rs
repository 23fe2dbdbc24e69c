use crate::cli::ServeArgs;
use crate::infra::{open_repository, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use camp_admin::auth::Authenticator;
use camp_admin::camp::{camp_router, CampAdministration};
use camp_admin::config::AppConfig;
use camp_admin::error::AppError;
use camp_admin::telemetry;
use std::sync::atomic::Ordering;
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
    if let Some(data_file) = args.data_file.take() {
        config.storage.data_file = Some(data_file);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(open_repository(&config.storage)?);
    let camp = Arc::new(CampAdministration::new(repository));
    let authenticator = Arc::new(Authenticator::from_config(&config.auth));

    let app = with_operational_routes(camp_router(camp, authenticator))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        admin = %config.auth.admin_username,
        "camp administration service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
