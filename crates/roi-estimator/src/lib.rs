//! ROI estimation for software automation purchases.
//!
//! The [`calculator`] module holds the pure derived-metric model and the input
//! bounds that feed it. The [`export`] module wraps the model in the
//! email-gated report download flow and the share helper.

pub mod calculator;
pub mod config;
pub mod error;
pub mod export;
pub mod telemetry;

pub use calculator::{compute_roi, CalculatorInput, RoiResult};
