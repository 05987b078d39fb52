use metrics_exporter_prometheus::PrometheusHandle;
use roi_estimator::config::ExportConfig;
use roi_estimator::export::{
    Clipboard, DeliveryError, NewsletterGateway, ReportFile, ReportSink, ShareContent,
    ShareError, ShareGateway, SubscriptionError, SubscriptionRequest,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Posts `{email, source}` as JSON to a mailing-list endpoint.
#[derive(Debug, Clone)]
pub(crate) struct HttpNewsletterGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNewsletterGateway {
    pub(crate) fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl NewsletterGateway for HttpNewsletterGateway {
    fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> impl Future<Output = Result<(), SubscriptionError>> + Send {
        async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|err| SubscriptionError::Transport(err.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let detail = response.text().await.unwrap_or_default();
            Err(SubscriptionError::Rejected(format!(
                "{status}: {}",
                detail.trim()
            )))
        }
    }
}

/// Accepts every subscription and only logs it. Used when no endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNewsletterGateway;

impl NewsletterGateway for LoggingNewsletterGateway {
    fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> impl Future<Output = Result<(), SubscriptionError>> + Send {
        let domain = request
            .email
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or_default();
        info!(source = %request.source, %domain, "newsletter subscription accepted without endpoint");
        std::future::ready(Ok(()))
    }
}

/// Newsletter backend picked from configuration at startup.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredNewsletter {
    Http(HttpNewsletterGateway),
    Logging(LoggingNewsletterGateway),
}

impl ConfiguredNewsletter {
    pub(crate) fn from_config(config: &ExportConfig) -> Self {
        match &config.newsletter_endpoint {
            Some(endpoint) => {
                Self::Http(HttpNewsletterGateway::new(reqwest::Client::new(), endpoint))
            }
            None => Self::Logging(LoggingNewsletterGateway),
        }
    }
}

impl NewsletterGateway for ConfiguredNewsletter {
    fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> impl Future<Output = Result<(), SubscriptionError>> + Send {
        async move {
            match self {
                ConfiguredNewsletter::Http(gateway) => gateway.subscribe(request).await,
                ConfiguredNewsletter::Logging(gateway) => gateway.subscribe(request).await,
            }
        }
    }
}

/// Writes delivered reports into a directory.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryReportSink {
    directory: PathBuf,
}

impl DirectoryReportSink {
    pub(crate) fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub(crate) fn path_for(&self, file: &ReportFile) -> PathBuf {
        self.directory.join(&file.filename)
    }
}

impl ReportSink for DirectoryReportSink {
    fn deliver(&self, file: &ReportFile) -> Result<(), DeliveryError> {
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.path_for(file), &file.bytes)?;
        Ok(())
    }
}

/// The HTTP response body carries the report; this only records the hand-off.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AttachmentSink;

impl ReportSink for AttachmentSink {
    fn deliver(&self, file: &ReportFile) -> Result<(), DeliveryError> {
        info!(
            filename = %file.filename,
            bytes = file.bytes.len(),
            "roi report attached to response"
        );
        Ok(())
    }
}

/// Terminals have no share sheet.
#[derive(Debug, Default)]
pub(crate) struct TerminalShare;

impl ShareGateway for TerminalShare {
    fn share(&self, _content: &ShareContent) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}

/// Prints the clipboard message so it can be copied by hand.
#[derive(Debug, Default)]
pub(crate) struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy(&self, text: &str) -> Result<(), ShareError> {
        println!("{text}");
        Ok(())
    }
}

/// Captures the clipboard message for the share endpoint.
#[derive(Debug, Default)]
pub(crate) struct CapturedClipboard {
    contents: Mutex<Option<String>>,
}

impl CapturedClipboard {
    pub(crate) fn take(&self) -> Option<String> {
        self.contents.lock().expect("clipboard mutex poisoned").take()
    }
}

impl Clipboard for CapturedClipboard {
    fn copy(&self, text: &str) -> Result<(), ShareError> {
        *self.contents.lock().expect("clipboard mutex poisoned") = Some(text.to_string());
        Ok(())
    }
}
