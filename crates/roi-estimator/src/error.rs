use crate::config::ConfigError;
use crate::export::{ExportError, SubscriptionError, RETRY_MESSAGE};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Export(ExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Export(ExportError::InvalidEmail(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(ExportError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Export(ExportError::Subscription(SubscriptionError::TimedOut(_))) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            AppError::Export(ExportError::Subscription(_)) => StatusCode::BAD_GATEWAY,
            AppError::Export(ExportError::Delivery(_) | ExportError::Serialization(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Export(ExportError::Subscription(_) | ExportError::Delivery(_)) => {
                warn!(error = %self, "report export failed");
                json!({ "error": RETRY_MESSAGE, "retryable": true })
            }
            _ => json!({ "error": self.to_string(), "retryable": false }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_failures_map_to_gateway_statuses() {
        let rejected = AppError::from(ExportError::Subscription(SubscriptionError::Rejected(
            "list closed".to_string(),
        )));
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);

        let timed_out =
            AppError::from(ExportError::Subscription(SubscriptionError::TimedOut(10)));
        assert_eq!(timed_out.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let invalid = AppError::from(ExportError::InvalidEmail("nope".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn provider_failures_show_retry_message_only() {
        let err = AppError::from(ExportError::Subscription(SubscriptionError::Transport(
            "error sending request for url (http://10.0.0.7/subscribe)".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(body["error"], RETRY_MESSAGE);
        assert_eq!(body["retryable"], true);
        assert!(!body.to_string().contains("10.0.0.7"));
    }
}
