use crate::infra::{AppState, AttachmentSink, CapturedClipboard, ConfiguredNewsletter};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use roi_estimator::calculator::{
    compute_roi, field_descriptors, CalculatorInput, FieldDescriptor, RawCalculatorInput,
    RoiDisplay, RoiResult,
};
use roi_estimator::error::AppError;
use roi_estimator::export::{
    share_results, ExportFlow, ShareContent, ShareError, ShareGateway, ShareOutcome,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub(crate) type ReportFlow = ExportFlow<ConfiguredNewsletter, AttachmentSink>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DefaultsResponse {
    pub(crate) inputs: CalculatorInput,
    pub(crate) fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculationResponse {
    pub(crate) inputs: CalculatorInput,
    pub(crate) results: RoiResult,
    pub(crate) display: RoiDisplay,
}

impl CalculationResponse {
    fn from_input(inputs: CalculatorInput) -> Self {
        let results = compute_roi(&inputs);
        Self {
            inputs,
            display: RoiDisplay::from_result(&results),
            results,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) inputs: RawCalculatorInput,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShareRequest {
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) inputs: RawCalculatorInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShareResponse {
    pub(crate) outcome: ShareOutcome,
    pub(crate) content: ShareContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) clipboard_message: Option<String>,
}

/// Server-side callers never have a share sheet; clients fall back to the clipboard text.
#[derive(Debug)]
struct NoShareSheet;

impl ShareGateway for NoShareSheet {
    fn share(&self, _content: &ShareContent) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}

pub(crate) fn with_roi_routes(flow: Arc<ReportFlow>) -> Router {
    Router::new()
        .route("/api/v1/roi/report", post(report_endpoint))
        .with_state(flow)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/roi/defaults", get(defaults_endpoint))
        .route("/api/v1/roi/calculate", post(calculate_endpoint))
        .route("/api/v1/roi/share", post(share_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn defaults_endpoint() -> Json<DefaultsResponse> {
    Json(DefaultsResponse {
        inputs: CalculatorInput::default(),
        fields: field_descriptors(),
    })
}

pub(crate) async fn calculate_endpoint(
    Json(payload): Json<RawCalculatorInput>,
) -> Json<CalculationResponse> {
    Json(CalculationResponse::from_input(payload.resolve()))
}

pub(crate) async fn report_endpoint(
    State(flow): State<Arc<ReportFlow>>,
    Json(payload): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let ReportRequest { email, inputs } = payload;
    let inputs = inputs.resolve();

    let file = flow.export(&email, &inputs).await?;
    info!(filename = %file.filename, "roi report exported");

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

pub(crate) async fn share_endpoint(Json(payload): Json<ShareRequest>) -> Response {
    let ShareRequest { url, inputs } = payload;
    let results = compute_roi(&inputs.resolve());
    let content = ShareContent::from_result(&results, &url);
    let clipboard = CapturedClipboard::default();

    match share_results(&content, &NoShareSheet, &clipboard) {
        Ok(outcome) => {
            let body = ShareResponse {
                outcome,
                content,
                clipboard_message: clipboard.take(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{HttpNewsletterGateway, LoggingNewsletterGateway};
    use axum::body::Body;
    use axum::http::Request;
    use roi_estimator::export::{ExportPolicy, RETRY_MESSAGE};
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router_with(newsletter: ConfiguredNewsletter) -> Router {
        let flow = ExportFlow::new(
            Arc::new(newsletter),
            Arc::new(AttachmentSink),
            ExportPolicy {
                subscription_timeout: Duration::from_secs(2),
                ..ExportPolicy::default()
            },
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle(),
            ),
        };
        with_roi_routes(Arc::new(flow)).layer(Extension(state))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
            .expect("request builds")
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn calculate_returns_results_and_display() {
        let Json(body) = calculate_endpoint(Json(RawCalculatorInput::default())).await;
        assert_eq!(body.inputs, CalculatorInput::default());
        assert_eq!(body.display.yearly_savings, "$311,760");
        assert!(body.results.investment.roi.is_some());
    }

    #[tokio::test]
    async fn calculate_route_renders_sentinel_for_zero_cost() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(post_json(
                "/api/v1/roi/calculate",
                json!({ "softwareCost": 0, "implementationCost": "" }),
            ))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert!(body["results"]["investment"]["roi"].is_null());
        assert!(body["results"]["investment"]["paybackPeriod"].is_null());
        assert_eq!(body["display"]["roi"], "N/A");
        assert_eq!(body["display"]["paybackPeriod"], "N/A");
    }

    #[tokio::test]
    async fn calculate_route_accepts_non_scalar_values() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(post_json(
                "/api/v1/roi/calculate",
                json!({ "softwareCost": true, "teamSize": [4] }),
            ))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["inputs"]["softwareCost"], 0.0);
        assert_eq!(body["inputs"]["teamSize"], 1.0);
    }

    #[tokio::test]
    async fn report_route_returns_attachment_after_subscription() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));

        let response = router
            .oneshot(post_json(
                "/api/v1/roi/report",
                json!({ "email": "test@example.com", "inputs": { "teamSize": 10 } }),
            ))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .expect("content disposition")
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"roi-report-"));

        let body = read_json_body(response).await;
        assert_eq!(body["email"], "test@example.com");
        assert_eq!(body["inputs"]["teamSize"], 10.0);
    }

    #[tokio::test]
    async fn report_route_rejects_invalid_email() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(post_json("/api/v1/roi/report", json!({ "email": "nope" })))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn report_route_surfaces_retryable_subscription_failure() {
        let gateway =
            HttpNewsletterGateway::new(reqwest::Client::new(), "http://127.0.0.1:9/subscribe");
        let router = router_with(ConfiguredNewsletter::Http(gateway));

        let response = router
            .oneshot(post_json(
                "/api/v1/roi/report",
                json!({ "email": "test@example.com" }),
            ))
            .await
            .expect("route responds");

        assert!(
            response.status() == StatusCode::BAD_GATEWAY
                || response.status() == StatusCode::GATEWAY_TIMEOUT
        );
        let body = read_json_body(response).await;
        assert_eq!(body["retryable"], true);
        assert_eq!(body["error"], RETRY_MESSAGE);
        assert!(!body.to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn share_route_falls_back_to_clipboard() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(post_json(
                "/api/v1/roi/share",
                json!({ "url": "https://example.com/roi" }),
            ))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["outcome"], "copied");
        assert!(body["clipboardMessage"]
            .as_str()
            .expect("clipboard message")
            .ends_with("https://example.com/roi"));
    }

    #[tokio::test]
    async fn defaults_route_lists_bounds() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(
                Request::get("/api/v1/roi/defaults")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["fields"][0]["field"], "manualHours");
        assert_eq!(body["fields"][0]["bounds"]["max"], 80.0);
        assert_eq!(body["inputs"]["automationPercentage"], 60.0);
    }

    #[tokio::test]
    async fn readiness_reports_ready() {
        let router = router_with(ConfiguredNewsletter::Logging(LoggingNewsletterGateway));
        let response = router
            .oneshot(
                Request::get("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
