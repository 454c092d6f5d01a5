use rusqlite::Connection;

use recbridge::Error;
use recbridge::storage::local::SEED_RECORDS;
use recbridge::storage::{LocalStore, Record, SearchFilter};
use recbridge::test_utils::fixtures::StoreFixture;

fn sorted_ids(records: &[Record]) -> Vec<&str> {
    let mut ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn test_open_creates_missing_directories() {
    let fixture = StoreFixture::new();
    let nested = fixture.temp_dir.path().join("a").join("b").join("store.db");
    let store = LocalStore::open(&nested).unwrap();
    assert!(store.path().is_absolute());
    assert!(nested.parent().unwrap().is_dir());
    store.close().unwrap();
    assert!(nested.exists());
}

#[test]
fn test_open_fails_when_parent_is_a_file() {
    let fixture = StoreFixture::new();
    let blocker = fixture.create_file("blocker", "not a directory");
    let err = LocalStore::open(blocker.join("store.db")).unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}

#[test]
fn test_seed_writes_bootstrap_rows_on_disk() {
    let fixture = StoreFixture::new();
    fixture.seeded().close().unwrap();

    let conn = Connection::open(&fixture.db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, i64::try_from(SEED_RECORDS.len()).unwrap());

    let payload: String = conn
        .query_row(
            "SELECT payload FROM records WHERE identifier = ?1",
            ["ID004"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(payload, "Older data for testing date filter");
}

#[test]
fn test_reseed_discards_operator_rows() {
    let fixture = StoreFixture::new();
    let mut store = fixture.seeded();
    store
        .insert(&Record::new("ID777", "2024-02-02", "temporary"))
        .unwrap();
    assert_eq!(store.query(&SearchFilter::all()).unwrap().len(), 5);

    store.reset_and_seed().unwrap();
    let rows = store.query(&SearchFilter::all()).unwrap();
    assert_eq!(sorted_ids(&rows), vec!["ID001", "ID002", "ID003", "ID004"]);
}

#[test]
fn test_query_filters() {
    let fixture = StoreFixture::new();
    let store = fixture.seeded();

    let by_date = SearchFilter::parse(Some("2024-01-15"), None).unwrap();
    assert_eq!(
        sorted_ids(&store.query(&by_date).unwrap()),
        vec!["ID001", "ID003"]
    );

    let by_id = SearchFilter::parse(None, Some("002")).unwrap();
    assert_eq!(sorted_ids(&store.query(&by_id).unwrap()), vec!["ID002"]);

    let both = SearchFilter::parse(Some("2024-01-15"), Some("003")).unwrap();
    assert_eq!(sorted_ids(&store.query(&both).unwrap()), vec!["ID003"]);

    let neither = SearchFilter::parse(Some("2023-12-20"), Some("001")).unwrap();
    assert!(store.query(&neither).unwrap().is_empty());
}

#[test]
fn test_hostile_fragment_is_bound_not_spliced() {
    let fixture = StoreFixture::new();
    let store = fixture.seeded();
    let filter = SearchFilter::parse(None, Some("' OR '1'='1")).unwrap();
    assert!(store.query(&filter).unwrap().is_empty());
    assert_eq!(store.query(&SearchFilter::all()).unwrap().len(), 4);
}

#[test]
fn test_insert_duplicate_identifier() {
    let fixture = StoreFixture::new();
    let mut store = fixture.seeded();
    let err = store
        .insert(&Record::new("ID001", "2024-01-01", "dup"))
        .unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
}

#[test]
fn test_query_without_table_is_query_error() {
    let fixture = StoreFixture::new();
    let store = fixture.open();
    let err = store.query(&SearchFilter::all()).unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
}

#[test]
fn test_fragment_is_literal_and_case_sensitive() {
    let fixture = StoreFixture::new();
    let mut store = fixture.seeded();
    store
        .insert(&Record::new("LOT_7%", "2024-03-01", "punctuated"))
        .unwrap();

    let query = |fragment: &str| {
        store
            .query(&SearchFilter::all().with_identifier(fragment))
            .unwrap()
    };
    assert!(query("id00").is_empty());
    assert_eq!(sorted_ids(&query("_")), vec!["LOT_7%"]);
    assert_eq!(sorted_ids(&query("%")), vec!["LOT_7%"]);
    assert_eq!(sorted_ids(&query("T_7")), vec!["LOT_7%"]);
    assert_eq!(query("ID00").len(), SEED_RECORDS.len());
}
