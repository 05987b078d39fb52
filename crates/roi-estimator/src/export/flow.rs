use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::gateway::{
    DeliveryError, NewsletterGateway, ReportSink, SubscriptionError, SubscriptionRequest,
};
use super::report::{ReportExport, ReportFile};
use crate::calculator::CalculatorInput;
use crate::config::ExportConfig;

/// Message shown when the export can be retried.
pub const RETRY_MESSAGE: &str = "We couldn't send your report. Please try again.";

/// Steps of the email-gated download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    AwaitingEmail,
    Submitting,
    Success,
    Failed,
}

impl ExportState {
    pub fn label(self) -> &'static str {
        match self {
            ExportState::Idle => "idle",
            ExportState::AwaitingEmail => "awaiting email",
            ExportState::Submitting => "submitting",
            ExportState::Success => "success",
            ExportState::Failed => "failed",
        }
    }

    fn accepts_submission(self) -> bool {
        matches!(self, ExportState::AwaitingEmail | ExportState::Failed)
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: ExportState,
    },
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("unable to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tunables for the export flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPolicy {
    /// Tag sent with every subscription so the list owner knows where it came from.
    pub source: String,
    pub subscription_timeout: Duration,
    /// How long the success confirmation stays up before the session resets.
    pub reset_delay: Duration,
    /// When false a failed subscription no longer blocks the download.
    pub require_subscription: bool,
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            source: "roi-calculator".to_string(),
            subscription_timeout: Duration::from_secs(10),
            reset_delay: Duration::from_secs(2),
            require_subscription: true,
        }
    }
}

impl From<&ExportConfig> for ExportPolicy {
    fn from(config: &ExportConfig) -> Self {
        Self {
            source: config.newsletter_source.clone(),
            subscription_timeout: config.subscription_timeout,
            reset_delay: config.reset_delay,
            require_subscription: config.require_subscription,
        }
    }
}

/// Collaborators plus policy shared by every export session.
pub struct ExportFlow<N, S> {
    newsletter: Arc<N>,
    sink: Arc<S>,
    policy: ExportPolicy,
}

impl<N, S> ExportFlow<N, S>
where
    N: NewsletterGateway,
    S: ReportSink,
{
    pub fn new(newsletter: Arc<N>, sink: Arc<S>, policy: ExportPolicy) -> Self {
        Self {
            newsletter,
            sink,
            policy,
        }
    }

    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    /// Drive a fresh session from `Idle` through a single submission.
    pub async fn export(
        &self,
        email: &str,
        input: &CalculatorInput,
    ) -> Result<ReportFile, ExportError> {
        let mut session = ExportSession::new();
        session.request_download()?;
        session.set_email(email)?;
        session.submit(self, input).await
    }

    async fn subscribe(&self, email: &str) -> Result<(), SubscriptionError> {
        let request = SubscriptionRequest {
            email: email.to_string(),
            source: self.policy.source.clone(),
        };

        match tokio::time::timeout(
            self.policy.subscription_timeout,
            self.newsletter.subscribe(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SubscriptionError::TimedOut(
                self.policy.subscription_timeout.as_secs(),
            )),
        }
    }

    fn deliver(&self, email: &str, input: &CalculatorInput) -> Result<ReportFile, ExportError> {
        let report = ReportExport::new(email, input.sanitized(), Utc::now());
        let file = report.to_file()?;
        self.sink.deliver(&file)?;
        Ok(file)
    }
}

/// One user's pass through the export modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSession {
    state: ExportState,
    email: String,
    error: Option<String>,
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            state: ExportState::Idle,
            email: String::new(),
            error: None,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Last user-visible error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open the email prompt.
    pub fn request_download(&mut self) -> Result<(), ExportError> {
        self.require(
            "request a download",
            matches!(self.state, ExportState::Idle),
        )?;
        self.state = ExportState::AwaitingEmail;
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), ExportError> {
        self.require("edit the email", self.state.accepts_submission())?;
        self.email = email.to_string();
        Ok(())
    }

    /// Close the prompt and forget the entered email.
    pub fn cancel(&mut self) -> Result<(), ExportError> {
        self.require("cancel", self.state.accepts_submission())?;
        self.clear();
        Ok(())
    }

    /// Subscribe the entered email, then build and deliver the report.
    ///
    /// On failure the session lands in [`ExportState::Failed`] with the email
    /// kept so the user can resubmit.
    pub async fn submit<N, S>(
        &mut self,
        flow: &ExportFlow<N, S>,
        input: &CalculatorInput,
    ) -> Result<ReportFile, ExportError>
    where
        N: NewsletterGateway,
        S: ReportSink,
    {
        self.require("submit", self.state.accepts_submission())?;

        let email = match validate_email(&self.email) {
            Ok(email) => email,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        self.state = ExportState::Submitting;
        self.error = None;
        debug!(source = %flow.policy.source, "submitting report request");

        // Dropping this future mid-subscription leaves the session Failed, not Submitting.
        let mut pending = PendingSubmission {
            session: self,
            settled: false,
        };
        let subscribed = flow.subscribe(&email).await;
        pending.settled = true;
        let session = &mut *pending.session;

        if let Err(err) = subscribed {
            if flow.policy.require_subscription {
                warn!(error = %err, "newsletter subscription failed; report withheld");
                session.fail();
                return Err(err.into());
            }
            warn!(error = %err, "newsletter subscription failed; delivering report anyway");
        }

        match flow.deliver(&email, input) {
            Ok(file) => {
                info!(filename = %file.filename, "roi report delivered");
                session.state = ExportState::Success;
                Ok(file)
            }
            Err(err) => {
                warn!(error = %err, "roi report delivery failed");
                session.fail();
                Err(err)
            }
        }
    }

    /// Return to `Idle` after a successful export.
    pub fn reset(&mut self) -> Result<(), ExportError> {
        self.require("reset", matches!(self.state, ExportState::Success))?;
        self.clear();
        Ok(())
    }

    /// Hold the success confirmation for the policy delay, then reset.
    ///
    /// Nothing schedules this automatically; the caller owning the session
    /// awaits it after a successful [`ExportSession::submit`].
    pub async fn finish<N, S>(&mut self, flow: &ExportFlow<N, S>) -> Result<(), ExportError>
    where
        N: NewsletterGateway,
        S: ReportSink,
    {
        self.require("finish", matches!(self.state, ExportState::Success))?;
        tokio::time::sleep(flow.policy.reset_delay).await;
        self.reset()
    }

    fn require(&self, action: &'static str, allowed: bool) -> Result<(), ExportError> {
        if allowed {
            Ok(())
        } else {
            Err(ExportError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn fail(&mut self) {
        self.state = ExportState::Failed;
        self.error = Some(RETRY_MESSAGE.to_string());
    }

    fn clear(&mut self) {
        self.state = ExportState::Idle;
        self.email.clear();
        self.error = None;
    }
}

/// Restores a retryable state if a submission is abandoned while awaiting the provider.
struct PendingSubmission<'a> {
    session: &'a mut ExportSession,
    settled: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("report submission abandoned before the subscription completed");
            self.session.fail();
        }
    }
}

/// Light structural check; the provider does the real verification.
pub fn validate_email(raw: &str) -> Result<String, ExportError> {
    let email = raw.trim();
    let invalid = || ExportError::InvalidEmail(email.to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let well_formed_domain = domain
        .split_once('.')
        .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !domain.ends_with('.'))
        .unwrap_or(false);
    if !well_formed_domain {
        return Err(invalid());
    }

    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert_eq!(
            validate_email("  test@example.com ").expect("valid"),
            "test@example.com"
        );
        assert!(validate_email("first.last@sub.example.co").is_ok());

        for bad in ["", "plainaddress", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@b."] {
            assert!(
                matches!(validate_email(bad), Err(ExportError::InvalidEmail(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn session_transitions_are_guarded() {
        let mut session = ExportSession::new();
        assert_eq!(session.state(), ExportState::Idle);
        assert!(session.set_email("x@example.com").is_err());
        assert!(session.cancel().is_err());
        assert!(session.reset().is_err());

        session.request_download().expect("opens prompt");
        assert_eq!(session.state(), ExportState::AwaitingEmail);
        assert!(matches!(
            session.request_download(),
            Err(ExportError::InvalidTransition {
                state: ExportState::AwaitingEmail,
                ..
            })
        ));

        session.set_email("x@example.com").expect("email accepted");
        session.cancel().expect("cancel allowed");
        assert_eq!(session.state(), ExportState::Idle);
        assert_eq!(session.email(), "");
    }

    #[test]
    fn policy_defaults() {
        let policy = ExportPolicy::default();
        assert_eq!(policy.subscription_timeout, Duration::from_secs(10));
        assert_eq!(policy.reset_delay, Duration::from_secs(2));
        assert!(policy.require_subscription);
    }
}
