use crate::cli::ServeArgs;
use crate::infra::{AppState, AttachmentSink, ConfiguredNewsletter};
use crate::routes::with_roi_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use roi_estimator::config::AppConfig;
use roi_estimator::error::AppError;
use roi_estimator::export::{ExportFlow, ExportPolicy};
use roi_estimator::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let newsletter = ConfiguredNewsletter::from_config(&config.export);
    if matches!(newsletter, ConfiguredNewsletter::Logging(_)) {
        info!("NEWSLETTER_ENDPOINT unset; subscriptions will only be logged");
    }
    let flow = Arc::new(ExportFlow::new(
        Arc::new(newsletter),
        Arc::new(AttachmentSink),
        ExportPolicy::from(&config.export),
    ));

    let app = with_roi_routes(flow)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        require_subscription = config.export.require_subscription,
        "roi estimator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
