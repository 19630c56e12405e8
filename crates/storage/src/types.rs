use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Builder;

use super::ids::SubmissionId;

/// Storage key used by the demo store, shared with older page scripts.
pub const DEFAULT_SUBMISSIONS_KEY: &str = "contactSubmissions";

/// Browser context captured alongside a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionContext {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub url: String,
}

/// One persisted contact-form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub fields: BTreeMap<String, String>,
    pub submitted_at_unix_millis: u64,
    #[serde(default)]
    pub context: SubmissionContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub fields: BTreeMap<String, String>,
    pub submitted_at_unix_millis: u64,
    pub context: SubmissionContext,
}

impl NewSubmission {
    pub fn new<I, K, V>(fields: I, submitted_at_unix_millis: u64) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            submitted_at_unix_millis,
            context: SubmissionContext::default(),
        }
    }

    pub fn with_context(mut self, context: SubmissionContext) -> Self {
        self.context = context;
        self
    }
}

/// Flat entry written by the pre-wasm contact script: form fields side by
/// side with an ISO-8601 `timestamp` and the browser context.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacySubmission {
    timestamp: String,
    #[serde(default)]
    user_agent: String,
    #[serde(default)]
    referrer: String,
    #[serde(default)]
    url: String,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl LegacySubmission {
    /// Legacy entries carry no id, so one is derived from the timestamp and
    /// the entry's position in the list. Positions never shift because the
    /// list is append-only.
    pub(crate) fn into_record(self, position: usize) -> SubmissionRecord {
        let submitted_at_unix_millis = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .and_then(|at| u64::try_from(at.timestamp_millis()).ok())
            .unwrap_or_default();

        let mut counter = [0_u8; 10];
        counter[2..].copy_from_slice(&(position as u64).to_be_bytes());
        let id = Builder::from_unix_timestamp_millis(submitted_at_unix_millis, &counter).into_uuid();

        let fields = self
            .fields
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(text) => Some((name, text)),
                serde_json::Value::Null
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_) => None,
                scalar => Some((name, scalar.to_string())),
            })
            .collect();

        SubmissionRecord {
            id: SubmissionId::new(id),
            fields,
            submitted_at_unix_millis,
            context: SubmissionContext {
                user_agent: self.user_agent,
                referrer: self.referrer,
                url: self.url,
            },
        }
    }
}

/// Any entry the demo list may hold.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredEntry {
    Record(SubmissionRecord),
    Legacy(LegacySubmission),
}

impl StoredEntry {
    pub(crate) fn into_record(self, position: usize) -> SubmissionRecord {
        match self {
            Self::Record(record) => record,
            Self::Legacy(legacy) => legacy.into_record(position),
        }
    }
}
