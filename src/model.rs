use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A typed column value. Serializes to the JSON shape the store expects:
/// `null`, a boolean, an ISO `YYYY-MM-DD` string, or plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub property_number: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_none_or(FieldValue::is_null)
    }

    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub property_number: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch_number: usize,
    pub first_property_number: String,
    pub last_property_number: String,
    pub record_count: usize,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Idle,
    Uploading { batch: usize },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub state: UploadState,
    pub failures: Vec<UploadFailure>,
    pub batch_failures: Vec<BatchFailure>,
    pub failed_ids: Vec<String>,
}

impl Default for UploadResult {
    fn default() -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            state: UploadState::Idle,
            failures: Vec::new(),
            batch_failures: Vec::new(),
            failed_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSource {
    pub path: String,
    pub sha256: String,
    pub header_count: usize,
    pub unmapped_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub mode: String,
    pub batch_size: usize,
    pub pause_ms: u64,
    pub store: Option<String>,
    pub id_utc_offset_hours: i32,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportCounts {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub skipped: usize,
    pub accepted: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRunReport {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub status: String,
    pub source: ReportSource,
    pub settings: ReportSettings,
    pub counts: ReportCounts,
    pub upload_state: Option<UploadState>,
    pub failures: Vec<UploadFailure>,
    pub batch_failures: Vec<BatchFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_ids: Option<Vec<String>>,
    pub warnings: Vec<String>,
}
