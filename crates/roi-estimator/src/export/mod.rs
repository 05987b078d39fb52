//! Email-gated report download and result sharing.
//!
//! A download opens an email prompt, subscribes the address to the newsletter
//! and only then serializes the current inputs and results into a JSON report.
//! The collaborators live behind the traits in [`gateway`] so the flow can be
//! driven by a browser bridge, the CLI, the HTTP service, or tests.

pub mod flow;
pub mod gateway;
pub mod report;
pub mod share;

pub use flow::{
    validate_email, ExportError, ExportFlow, ExportPolicy, ExportSession, ExportState,
    RETRY_MESSAGE,
};
pub use gateway::{
    Clipboard, DeliveryError, NewsletterGateway, ReportSink, ShareError, ShareGateway,
    SubscriptionError, SubscriptionRequest,
};
pub use report::{ReportExport, ReportFile};
pub use share::{share_results, ShareContent, ShareOutcome};
