use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::{compute_roi, CalculatorInput, RoiResult};

/// Snapshot handed to the user as a downloadable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub generated_at: DateTime<Utc>,
    pub email: String,
    pub inputs: CalculatorInput,
    pub results: RoiResult,
}

impl ReportExport {
    pub fn new(email: &str, inputs: CalculatorInput, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            email: email.to_string(),
            results: compute_roi(&inputs),
            inputs,
        }
    }

    pub fn filename(&self) -> String {
        format!("roi-report-{}.json", self.generated_at.format("%Y-%m-%d"))
    }

    pub fn to_file(&self) -> Result<ReportFile, serde_json::Error> {
        let bytes = serde_json::to_vec_pretty(self)?;
        Ok(ReportFile {
            filename: self.filename(),
            content_type: ReportFile::JSON_CONTENT_TYPE,
            bytes,
        })
    }
}

/// Serialized report ready for a [`super::ReportSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ReportFile {
    pub const JSON_CONTENT_TYPE: &'static str = "application/json";
}
