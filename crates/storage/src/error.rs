use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    #[snafu(display("storage backend failed for key '{key}' on `{stage}`: {details}"))]
    Backend {
        stage: &'static str,
        key: String,
        details: String,
    },
    #[snafu(display("failed to serialize submission records on `{stage}`: {source}"))]
    SerializeRecords {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("stored value under '{key}' is not a submission list: {source}"))]
    DeserializeRecords {
        stage: &'static str,
        key: String,
        source: serde_json::Error,
    },
    #[snafu(display("storage id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: uuid::Error,
    },
}

impl StorageError {
    /// Builds a backend failure from an opaque host error description.
    pub fn backend(stage: &'static str, key: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Backend {
            stage,
            key: key.into(),
            details: details.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
