use recbridge::Error;
use recbridge::remote::{RemoteStore, UploadCandidate};
use recbridge::storage::SearchFilter;
use recbridge::test_utils::fixtures::remote_config;
use recbridge::test_utils::memory_remote::MemoryDriver;

fn row(id: &str, date: &str, payload: &str) -> UploadCandidate {
    UploadCandidate::Positional(vec![id.to_string(), date.to_string(), payload.to_string()])
}

fn uploaded_ids(driver: &MemoryDriver) -> Vec<String> {
    driver
        .committed_rows()
        .into_iter()
        .map(|row| row.mrlcode)
        .collect()
}

#[test]
fn test_empty_upload_sends_nothing() {
    let driver = MemoryDriver::new();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let outcome = conn.upload(&[]).unwrap();
    assert_eq!(outcome.summary(), (true, 0));
    assert_eq!(driver.batches(), 0);
    conn.close().unwrap();
}

#[test]
fn test_full_batch_commits() {
    let driver = MemoryDriver::new();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let outcome = conn
        .upload(&[
            row("UP1", "2024-04-01", "first"),
            row("UP2", "2024-04-02", "second"),
            row("UP3", "2024-04-03", "third"),
        ])
        .unwrap();
    assert_eq!(outcome.summary(), (true, 3));
    assert!(outcome.failures.is_empty());
    assert_eq!(driver.batches(), 1);
    conn.close().unwrap();

    assert_eq!(uploaded_ids(&driver), vec!["UP1", "UP2", "UP3"]);
    let annotations: Vec<_> = driver
        .committed_rows()
        .into_iter()
        .map(|row| row.uda1.unwrap_or_default())
        .collect();
    assert_eq!(annotations, vec!["first", "second", "third"]);
}

#[test]
fn test_one_rejected_row_rolls_back_everything() {
    let driver = MemoryDriver::new();
    driver.reject_code("UP2");
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();

    let outcome = conn
        .upload(&[
            row("UP1", "2024-04-01", "first"),
            row("UP2", "2024-04-02", "second"),
            row("UP3", "2024-04-03", "third"),
        ])
        .unwrap();
    assert_eq!(outcome.summary(), (false, 2));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].offset, 1);
    assert!(outcome.failures[0].message.contains("ORA-00001"));

    // Nothing from the batch is visible, even inside the same session.
    let found = conn
        .query(&SearchFilter::parse(None, Some("UP")).unwrap())
        .unwrap();
    assert!(found.rows.is_empty());
    conn.close().unwrap();
    assert!(driver.committed_rows().is_empty());
}

#[test]
fn test_bad_date_is_a_row_failure() {
    let driver = MemoryDriver::new();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let outcome = conn
        .upload(&[row("UP1", "2024-04-01", "ok"), row("UP2", "April 2", "bad")])
        .unwrap();
    assert_eq!(outcome.summary(), (false, 1));
    assert!(outcome.failures[0].message.contains("ORA-01861"));
    conn.close().unwrap();
    assert!(driver.committed_rows().is_empty());
}

#[test]
fn test_malformed_candidates_are_skipped() {
    let driver = MemoryDriver::new();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();

    let candidates: Vec<UploadCandidate> = serde_json::from_str(
        r#"[
            ["UP1", "2024-04-01", "positional"],
            ["too", "short"],
            {"id": "UP2", "event_date": "2024-04-02", "data": "named"},
            {"identifier": "UP3", "event_date": "2024-04-03"}
        ]"#,
    )
    .unwrap();
    let outcome = conn.upload(&candidates).unwrap();
    assert_eq!(outcome.summary(), (true, 2));
    assert_eq!(outcome.skipped, 2);
    conn.close().unwrap();
    assert_eq!(uploaded_ids(&driver), vec!["UP1", "UP2"]);
}

#[test]
fn test_only_malformed_candidates_sends_nothing() {
    let driver = MemoryDriver::new();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let outcome = conn
        .upload(&[UploadCandidate::Positional(vec!["lonely".to_string()])])
        .unwrap();
    assert_eq!(outcome.summary(), (true, 0));
    assert_eq!(outcome.skipped, 1);
    assert_eq!(driver.batches(), 0);
    conn.close().unwrap();
}

#[test]
fn test_submit_failure_is_upload_error() {
    let driver = MemoryDriver::new();
    driver.fail_next_submit();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let err = conn
        .upload(&[row("UP1", "2024-04-01", "first")])
        .unwrap_err();
    assert!(matches!(err, Error::Upload { .. }));
    assert_eq!(err.code(), "upload_error");

    // The session stays usable after the failed batch.
    let outcome = conn.upload(&[row("UP1", "2024-04-01", "first")]).unwrap();
    assert_eq!(outcome.summary(), (true, 1));
    conn.close().unwrap();
    assert_eq!(driver.open_sessions(), 0);
}

#[test]
fn test_commit_failure_leaves_nothing_behind() {
    let driver = MemoryDriver::new();
    driver.fail_next_commit();
    let store = RemoteStore::new(driver.clone(), remote_config());
    let mut conn = store.open().unwrap();
    let err = conn
        .upload(&[row("UP1", "2024-04-01", "first")])
        .unwrap_err();
    assert!(matches!(err, Error::Upload { .. }));
    drop(conn);
    assert!(driver.committed_rows().is_empty());
    assert_eq!(driver.open_sessions(), 0);
}
