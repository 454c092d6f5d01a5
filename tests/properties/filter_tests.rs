use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;

use recbridge::storage::{LocalStore, Record, SearchFilter};
use recbridge::test_utils::fixtures::StoreFixture;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u32..6).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 10 + offset).unwrap()
    })
}

// Mixed case and LIKE wildcard characters: matching must stay literal.
fn arb_identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_%]{3,8}"
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map(arb_identifier(), (arb_date(), "[a-z ]{0,12}"), 0..20).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(identifier, (date, payload))| {
                    Record::new(identifier, date.format("%Y-%m-%d").to_string(), payload)
                })
                .collect()
        },
    )
}

fn arb_filter() -> impl Strategy<Value = SearchFilter> {
    (
        prop::option::of(arb_date()),
        prop::option::of("[A-Za-z0-9_%]{1,3}"),
    )
        .prop_map(|(event_date, identifier_fragment)| SearchFilter {
            event_date,
            identifier_fragment,
        })
}

fn load(records: &[Record]) -> (StoreFixture, LocalStore) {
    let fixture = StoreFixture::new();
    let mut store = fixture.seeded();
    for record in records {
        store.insert(record).unwrap();
    }
    (fixture, store)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_query_is_the_predicate_subset(records in arb_records(), filter in arb_filter()) {
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| !r.identifier.starts_with("ID00"))
            .collect();
        let (_fixture, store) = load(&records);

        let all = store.query(&SearchFilter::all()).unwrap();
        let expected: BTreeSet<String> = all
            .iter()
            .filter(|r| filter.matches(&r.identifier, &r.event_date))
            .map(|r| r.identifier.clone())
            .collect();
        let actual: BTreeSet<String> = store
            .query(&filter)
            .unwrap()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_reset_is_idempotent(records in arb_records()) {
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| !r.identifier.starts_with("ID00"))
            .collect();
        let (_fixture, mut store) = load(&records);

        store.reset_and_seed().unwrap();
        let first: BTreeSet<String> = store
            .query(&SearchFilter::all())
            .unwrap()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        store.reset_and_seed().unwrap();
        let second: BTreeSet<String> = store
            .query(&SearchFilter::all())
            .unwrap()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        prop_assert_eq!(first.len(), 4);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_filter_parse_never_panics(date in ".*", fragment in ".*") {
        let _ = SearchFilter::parse(Some(&date), Some(&fragment));
    }
}
