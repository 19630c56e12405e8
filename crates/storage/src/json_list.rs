use snafu::ResultExt;

use super::error::{DeserializeRecordsSnafu, SerializeRecordsSnafu, StorageResult};
use super::ids::SubmissionId;
use super::types::{DEFAULT_SUBMISSIONS_KEY, NewSubmission, StoredEntry, SubmissionRecord};
use super::{KeyValueBackend, SubmissionStore};

const UNREADABLE_SUFFIX: &str = ".unreadable";

/// Keeps every submission as one JSON array under a single backend key.
///
/// The whole list is rewritten on append; the demo store only ever holds a
/// handful of entries per browser profile.
pub struct JsonListStore<B> {
    backend: B,
    key: String,
}

impl<B> JsonListStore<B>
where
    B: KeyValueBackend,
{
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_SUBMISSIONS_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Key that receives an unreadable list before it is replaced.
    pub fn backup_key(&self) -> String {
        format!("{}{UNREADABLE_SUFFIX}", self.key)
    }

    fn read_raw(&self) -> StorageResult<Option<String>> {
        let raw = self.backend.read(&self.key)?;
        Ok(raw.filter(|raw| !raw.trim().is_empty()))
    }

    /// Entries are kept as raw JSON so shapes written by other scripts
    /// survive a rewrite untouched.
    fn load(&self, stage: &'static str) -> StorageResult<Vec<serde_json::Value>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).context(DeserializeRecordsSnafu {
            stage,
            key: self.key.clone(),
        })
    }

    fn save(&self, entries: &[serde_json::Value]) -> StorageResult<()> {
        let payload = serde_json::to_string(entries).context(SerializeRecordsSnafu {
            stage: "serialize-submission-list",
        })?;
        self.backend.write(&self.key, &payload)
    }

    /// Copies an unreadable list to [`Self::backup_key`] so the next write
    /// does not lose it.
    fn set_aside_unreadable(&self) -> StorageResult<()> {
        if let Some(raw) = self.read_raw()? {
            self.backend.write(&self.backup_key(), &raw)?;
        }
        Ok(())
    }
}

impl<B> SubmissionStore for JsonListStore<B>
where
    B: KeyValueBackend,
{
    fn append_submission(&self, input: NewSubmission) -> StorageResult<SubmissionRecord> {
        let mut entries = match self.load("load-before-append") {
            Ok(entries) => entries,
            Err(error) => {
                // A corrupt demo list must not block new submissions.
                self.set_aside_unreadable()?;
                tracing::warn!(
                    key = %self.key,
                    backup = %self.backup_key(),
                    %error,
                    "moved unreadable submission list aside"
                );
                Vec::new()
            }
        };

        let record = SubmissionRecord {
            id: SubmissionId::new_v7(),
            fields: input.fields,
            submitted_at_unix_millis: input.submitted_at_unix_millis,
            context: input.context,
        };
        let value = serde_json::to_value(&record).context(SerializeRecordsSnafu {
            stage: "serialize-submission",
        })?;
        entries.push(value);
        self.save(&entries)?;

        tracing::debug!(key = %self.key, id = %record.id, total = entries.len(), "stored submission");
        Ok(record)
    }

    fn list_submissions(&self) -> StorageResult<Vec<SubmissionRecord>> {
        let entries = self.load("list-submissions")?;
        let records = entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| match serde_json::from_value::<StoredEntry>(value) {
                Ok(entry) => Some(entry.into_record(position)),
                Err(error) => {
                    tracing::warn!(
                        key = %self.key,
                        position,
                        %error,
                        "skipping unrecognized submission entry"
                    );
                    None
                }
            })
            .collect();
        Ok(records)
    }

    fn clear_submissions(&self) -> StorageResult<()> {
        self.backend.remove(&self.key)
    }
}
