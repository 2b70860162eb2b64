use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::postgrest::parse_content_range_total;
use super::*;
use crate::model::FieldValue;

fn record(property_number: &str, name: &str) -> NormalizedRecord {
    let mut fields = BTreeMap::new();
    fields.insert(
        "property_name".to_string(),
        FieldValue::Text(name.to_string()),
    );
    fields.insert(
        "register_date".to_string(),
        FieldValue::Date(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
    );
    fields.insert("status".to_string(), FieldValue::Text("거래가능".to_string()));
    fields.insert("shared".to_string(), FieldValue::Bool(true));
    NormalizedRecord {
        property_number: property_number.to_string(),
        fields,
    }
}

#[test]
fn content_range_total_reads_both_forms() {
    assert_eq!(parse_content_range_total("0-24/889"), Some(889));
    assert_eq!(parse_content_range_total("*/0"), Some(0));
    assert_eq!(parse_content_range_total("0-24/*"), None);
    assert_eq!(parse_content_range_total("garbage"), None);
}

#[tokio::test]
async fn sqlite_store_inserts_and_counts() {
    let store = SqliteStore::open_in_memory("properties").expect("in-memory store");

    let inserted = store
        .insert(&[record("202508150001", "A"), record("202508150002", "B")])
        .await
        .expect("insert succeeds");
    assert_eq!(inserted, 2);
    assert_eq!(store.count().await.expect("count"), 2);
    assert_eq!(store.describe(), "sqlite::memory:#properties");
}

#[tokio::test]
async fn sqlite_store_rejects_whole_call_on_duplicate_key() {
    let store = SqliteStore::open_in_memory("properties").expect("in-memory store");
    store
        .insert(&[record("202508150001", "A")])
        .await
        .expect("first insert succeeds");

    let err = store
        .insert(&[record("202508150002", "B"), record("202508150001", "dup")])
        .await
        .expect_err("duplicate key must fail");
    assert!(matches!(err, StoreError::Database(_)));

    // The non-duplicate row in the rejected call was rolled back too.
    assert_eq!(store.count().await.expect("count"), 1);
}

#[tokio::test]
async fn sqlite_store_keeps_record_json() {
    let store = SqliteStore::open_in_memory("listings").expect("in-memory store");
    store
        .insert(&[record("202508150001", "Tower")])
        .await
        .expect("insert succeeds");

    let connection = store.lock().expect("lock");
    let (name, date, raw): (String, String, String) = connection
        .query_row(
            "SELECT property_name, register_date, record_json FROM listings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("row present");
    assert_eq!(name, "Tower");
    assert_eq!(date, "2025-08-15");

    let json: serde_json::Value = serde_json::from_str(&raw).expect("json column");
    assert_eq!(json["property_number"], "202508150001");
    assert_eq!(json["shared"], true);
}

#[test]
fn open_store_builds_sqlite_backend_on_disk() {
    let dir = std::env::temp_dir().join(format!("realty-store-{}", std::process::id()));
    let config = StoreConfig::Sqlite {
        path: dir.join("realty.sqlite"),
        table: "properties".to_string(),
    };

    let store = open_store(&config).expect("sqlite store opens");
    assert!(store.describe().ends_with("realty.sqlite#properties"));
    assert!(dir.join("realty.sqlite").exists());

    drop(store);
    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn rejected_error_carries_status_and_body() {
    let err = StoreError::Rejected {
        status: 409,
        message: "duplicate key value violates unique constraint".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "store rejected request (409): duplicate key value violates unique constraint"
    );
}

#[tokio::test]
async fn sqlite_latest_property_number_orders_widened_sequences_last() {
    let store = SqliteStore::open_in_memory("properties").expect("in-memory store");
    assert_eq!(
        store.latest_property_number("20250815").await.expect("lookup"),
        None
    );

    store
        .insert(&[
            record("202508149999", "yesterday"),
            record("202508159999", "A"),
            record("2025081510000", "B"),
        ])
        .await
        .expect("insert succeeds");

    assert_eq!(
        store.latest_property_number("20250815").await.expect("lookup"),
        Some("2025081510000".to_string())
    );
    assert_eq!(
        store.latest_property_number("20250814").await.expect("lookup"),
        Some("202508149999".to_string())
    );
}

#[tokio::test]
async fn sqlite_delete_all_empties_the_table() {
    let store = SqliteStore::open_in_memory("properties").expect("in-memory store");
    store
        .insert(&[record("202508150001", "A"), record("202508150002", "B")])
        .await
        .expect("insert succeeds");

    store.delete_all().await.expect("delete succeeds");
    assert_eq!(store.count().await.expect("count"), 0);

    // The same numbers are free again.
    store
        .insert(&[record("202508150001", "A")])
        .await
        .expect("reinsert succeeds");
    assert_eq!(store.count().await.expect("count"), 1);
}
