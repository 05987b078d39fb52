use std::fmt::Debug;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::report::ReportFile;
use super::share::ShareContent;

/// Payload sent to the newsletter provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub email: String,
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("subscription rejected: {0}")]
    Rejected(String),
    #[error("subscription transport failed: {0}")]
    Transport(String),
    #[error("subscription timed out after {0} seconds")]
    TimedOut(u64),
}

/// Outbound mailing-list hook. The only fallible network step of the export.
pub trait NewsletterGateway: Send + Sync {
    fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> impl Future<Output = Result<(), SubscriptionError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("unable to save report: {0}")]
    Io(#[from] std::io::Error),
    #[error("report delivery unavailable: {0}")]
    Unavailable(String),
}

/// Local save of a generated report (browser download, file on disk, HTTP attachment).
pub trait ReportSink: Send + Sync {
    fn deliver(&self, file: &ReportFile) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("native share is not supported")]
    Unsupported,
    #[error("share failed: {0}")]
    Failed(String),
}

/// Platform share sheet.
pub trait ShareGateway: Debug {
    fn share(&self, content: &ShareContent) -> Result<(), ShareError>;
}

/// Clipboard fallback used when the share sheet is unavailable.
pub trait Clipboard: Debug {
    fn copy(&self, text: &str) -> Result<(), ShareError>;
}
