use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCatalog, InMemoryQuestionStore, InMemoryQuotaRepository,
    InMemoryVendorDirectory,
};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use survey_quota::config::AppConfig;
use survey_quota::error::AppError;
use survey_quota::telemetry;
use survey_quota::workflows::builder::QuestionSyncService;
use survey_quota::workflows::quota::QuotaService;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let quota_service = Arc::new(QuotaService::new(
        Arc::new(InMemoryCatalog::default()),
        Arc::new(InMemoryVendorDirectory),
        Arc::new(InMemoryQuotaRepository::default()),
    ));
    let question_service = Arc::new(QuestionSyncService::new(
        Arc::new(InMemoryQuestionStore::default()),
        config.sync,
    ));

    let app = with_survey_routes(quota_service, question_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        create_attempts = config.sync.max_create_attempts,
        "survey quota service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
