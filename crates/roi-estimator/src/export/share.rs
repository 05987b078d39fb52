use serde::Serialize;
use tracing::debug;

use super::gateway::{Clipboard, ShareError, ShareGateway};
use crate::calculator::format;
use crate::calculator::RoiResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareContent {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareContent {
    pub fn from_result(result: &RoiResult, url: &str) -> Self {
        let text = format!(
            "Automation could save us {} a year ({} ROI). Check out this ROI calculator:",
            format::currency(result.savings.yearly),
            format::percent(result.investment.roi),
        );
        Self {
            title: "Software ROI Calculator".to_string(),
            text,
            url: url.to_string(),
        }
    }

    /// Message placed on the clipboard when no share sheet exists.
    pub fn clipboard_message(&self) -> String {
        format!("{} {}", self.text, self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    Copied,
}

/// Try the share sheet first, then fall back to the clipboard.
pub fn share_results(
    content: &ShareContent,
    share: &dyn ShareGateway,
    clipboard: &dyn Clipboard,
) -> Result<ShareOutcome, ShareError> {
    match share.share(content) {
        Ok(()) => Ok(ShareOutcome::Shared),
        Err(err) => {
            debug!(error = %err, "native share unavailable, copying to clipboard");
            clipboard.copy(&content.clipboard_message())?;
            Ok(ShareOutcome::Copied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{compute_roi, CalculatorInput};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct NoShareSheet;

    impl ShareGateway for NoShareSheet {
        fn share(&self, _content: &ShareContent) -> Result<(), ShareError> {
            Err(ShareError::Unsupported)
        }
    }

    #[derive(Debug, Default)]
    struct RecordingShare {
        shared: Mutex<Vec<ShareContent>>,
    }

    impl ShareGateway for RecordingShare {
        fn share(&self, content: &ShareContent) -> Result<(), ShareError> {
            self.shared.lock().expect("share mutex").push(content.clone());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MemoryClipboard {
        contents: Mutex<Option<String>>,
    }

    impl Clipboard for MemoryClipboard {
        fn copy(&self, text: &str) -> Result<(), ShareError> {
            *self.contents.lock().expect("clipboard mutex") = Some(text.to_string());
            Ok(())
        }
    }

    fn content() -> ShareContent {
        let result = compute_roi(&CalculatorInput::default());
        ShareContent::from_result(&result, "https://example.com/roi")
    }

    #[test]
    fn composes_message_from_results() {
        let content = content();
        assert!(content.text.contains("$311,760"));
        assert!(content.text.contains("2734.2%"));
        assert!(content
            .clipboard_message()
            .ends_with("https://example.com/roi"));
    }

    #[test]
    fn uses_share_sheet_when_available() {
        let share = RecordingShare::default();
        let clipboard = MemoryClipboard::default();
        let outcome = share_results(&content(), &share, &clipboard).expect("shared");

        assert_eq!(outcome, ShareOutcome::Shared);
        assert_eq!(share.shared.lock().expect("share mutex").len(), 1);
        assert!(clipboard.contents.lock().expect("clipboard mutex").is_none());
    }

    #[test]
    fn falls_back_to_clipboard() {
        let clipboard = MemoryClipboard::default();
        let outcome = share_results(&content(), &NoShareSheet, &clipboard).expect("copied");

        assert_eq!(outcome, ShareOutcome::Copied);
        let copied = clipboard
            .contents
            .lock()
            .expect("clipboard mutex")
            .clone()
            .expect("clipboard populated");
        assert!(copied.starts_with("Automation could save us"));
    }
}
