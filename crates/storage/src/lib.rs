pub mod error;
pub mod ids;
pub mod json_list;
pub mod memory;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use ids::SubmissionId;
pub use json_list::JsonListStore;
pub use memory::MemoryBackend;
pub use types::{DEFAULT_SUBMISSIONS_KEY, NewSubmission, SubmissionContext, SubmissionRecord};

/// Raw string storage offered by the host (browser `localStorage`, memory in tests).
pub trait KeyValueBackend {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T> KeyValueBackend for &T
where
    T: KeyValueBackend + ?Sized,
{
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

pub trait SubmissionStore {
    fn append_submission(&self, input: NewSubmission) -> StorageResult<SubmissionRecord>;
    fn list_submissions(&self) -> StorageResult<Vec<SubmissionRecord>>;
    fn clear_submissions(&self) -> StorageResult<()>;
}
