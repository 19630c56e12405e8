use linebiz_storage::{
    DEFAULT_SUBMISSIONS_KEY, JsonListStore, KeyValueBackend, MemoryBackend, NewSubmission,
    StorageError, SubmissionContext, SubmissionStore,
};
use pretty_assertions::assert_eq;

fn sample(company: &str, at: u64) -> NewSubmission {
    NewSubmission::new([("company", company), ("email", "info@example.jp")], at)
}

#[test]
fn empty_backend_lists_nothing() {
    let store = JsonListStore::new(MemoryBackend::new());
    assert!(store.list_submissions().unwrap().is_empty());
}

#[test]
fn appended_submissions_keep_insertion_order() {
    let store = JsonListStore::new(MemoryBackend::new());
    let first = store.append_submission(sample("テテテ株式会社", 1)).unwrap();
    let second = store
        .append_submission(sample("サンプル商事", 2).with_context(SubmissionContext {
            user_agent: "test-agent".to_string(),
            referrer: String::new(),
            url: "https://example.jp/contact".to_string(),
        }))
        .unwrap();

    let listed = store.list_submissions().unwrap();
    assert_eq!(listed, vec![first, second.clone()]);
    assert_eq!(listed[1].context.user_agent, "test-agent");
    assert_eq!(listed[1].fields["company"], "サンプル商事");
}

#[test]
fn records_are_written_under_the_shared_key() {
    let backend = MemoryBackend::new();
    let store = JsonListStore::new(&backend);
    store.append_submission(sample("A", 10)).unwrap();

    let raw = backend.read(DEFAULT_SUBMISSIONS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["submittedAtUnixMillis"], 10);
    assert_eq!(value[0]["fields"]["company"], "A");
}

#[test]
fn corrupt_list_is_reported_on_read_and_set_aside_on_append() {
    let backend = MemoryBackend::new();
    backend.write(DEFAULT_SUBMISSIONS_KEY, "{not json").unwrap();
    let store = JsonListStore::new(&backend);

    assert!(matches!(
        store.list_submissions(),
        Err(StorageError::DeserializeRecords { .. })
    ));

    store.append_submission(sample("B", 3)).unwrap();
    assert_eq!(store.list_submissions().unwrap().len(), 1);
    assert_eq!(
        backend.read(&store.backup_key()).unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn flat_entries_from_the_page_script_survive_an_append() {
    let backend = MemoryBackend::new();
    let legacy = r#"[{"company":"A社","name":"山田","email":"a@example.jp","employees":12,"timestamp":"2024-01-01T00:00:00.000Z","userAgent":"old-agent","url":"https://example.jp/contact"}]"#;
    backend.write(DEFAULT_SUBMISSIONS_KEY, legacy).unwrap();
    let store = JsonListStore::new(&backend);

    let appended = store.append_submission(sample("B社", 5)).unwrap();

    let raw = backend.read(DEFAULT_SUBMISSIONS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["company"], "A社");
    assert_eq!(value[0]["timestamp"], "2024-01-01T00:00:00.000Z");
    assert_eq!(value[1]["fields"]["company"], "B社");

    let listed = store.list_submissions().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].fields["company"], "A社");
    assert_eq!(listed[0].fields["employees"], "12");
    assert!(!listed[0].fields.contains_key("timestamp"));
    assert_eq!(listed[0].submitted_at_unix_millis, 1_704_067_200_000);
    assert_eq!(listed[0].context.user_agent, "old-agent");
    assert_eq!(listed[1], appended);
}

#[test]
fn derived_legacy_ids_are_stable_across_reads() {
    let backend = MemoryBackend::new();
    backend
        .write(
            DEFAULT_SUBMISSIONS_KEY,
            r#"[{"company":"A","timestamp":"2024-01-01T00:00:00Z"},{"company":"A","timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
    let store = JsonListStore::new(&backend);

    let first = store.list_submissions().unwrap();
    let second = store.list_submissions().unwrap();
    assert_eq!(first, second);
    assert_ne!(first[0].id, first[1].id);
}

#[test]
fn unrecognized_entries_are_skipped_on_read_but_kept_on_disk() {
    let backend = MemoryBackend::new();
    backend
        .write(DEFAULT_SUBMISSIONS_KEY, r#"[42, {"company":"A","timestamp":"2024-01-01T00:00:00Z"}]"#)
        .unwrap();
    let store = JsonListStore::new(&backend);

    assert_eq!(store.list_submissions().unwrap().len(), 1);
    store.append_submission(sample("B", 1)).unwrap();

    let raw = backend.read(DEFAULT_SUBMISSIONS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0], 42);
    assert_eq!(value.as_array().map(Vec::len), Some(3));
}

#[test]
fn clear_removes_the_key() {
    let backend = MemoryBackend::new();
    let store = JsonListStore::with_key(&backend, "custom");
    store.append_submission(sample("C", 4)).unwrap();
    assert_eq!(backend.len(), 1);

    store.clear_submissions().unwrap();
    assert!(backend.is_empty());
    assert!(store.list_submissions().unwrap().is_empty());
}
