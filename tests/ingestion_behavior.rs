//! Behavior-driven tests for ingestion.
//!
//! These tests verify HOW fetched payloads become stored rows: upsert
//! semantics on the `(symbol, date)` key and the normalization pipeline's
//! tolerance for missing or failing symbols.

use std::sync::Arc;

use tempfile::tempdir;
use tickvault_core::{fetch_all, normalize, AlphaVantageClient, Symbol};
use tickvault_store::QueryError;
use tickvault_tests::{batch_of, daily_payload, entry, open_store, range, ScriptedHttpClient};

// =============================================================================
// Ingestion: Upsert Semantics
// =============================================================================

#[test]
fn when_user_ingests_a_day_it_becomes_queryable_immediately() {
    // Given: A fresh store
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    // When: One day of IBM lands
    let rows = vec![entry("IBM", "2024-01-01", "100", "101", "1000")];
    let report = store.upsert_entries("run-1", &rows).expect("upsert");

    // Then: Exactly that row is stored, with its exact text
    assert_eq!(report.inserted, 1);
    assert_eq!(report.updated, 0);

    let page = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("query");
    assert_eq!(page.pagination.count, 1);
    assert_eq!(page.data[0].symbol.as_str(), "IBM");
    assert_eq!(page.data[0].open_price, "100");
    assert_eq!(page.data[0].close_price, "101");
    assert_eq!(page.data[0].volume, "1000");
}

#[test]
fn when_user_reingests_a_day_prices_update_in_place() {
    // Given: A store already holding IBM 2024-01-01
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    store
        .upsert_entries("run-1", &[entry("IBM", "2024-01-01", "100", "101", "1000")])
        .expect("first upsert");

    // When: The same day arrives again with a revised close
    let report = store
        .upsert_entries("run-2", &[entry("IBM", "2024-01-01", "100", "105", "1000")])
        .expect("second upsert");

    // Then: The row was replaced, not duplicated
    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 1);

    let page = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("query");
    assert_eq!(page.pagination.count, 1);
    assert_eq!(page.data[0].close_price, "105");
}

#[test]
fn when_user_repeats_an_identical_run_the_row_count_is_stable() {
    // Given: Three stored days
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let rows = vec![
        entry("IBM", "2024-01-01", "100", "101", "1000"),
        entry("IBM", "2024-01-02", "101", "102", "1100"),
        entry("IBM", "2024-01-03", "102", "103", "1200"),
    ];
    store.upsert_entries("run-1", &rows).expect("first upsert");

    // When: The identical batch runs again
    let report = store.upsert_entries("run-2", &rows).expect("second upsert");

    // Then: Every row counted as an update and the total never grew
    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 3);

    let page = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("query");
    assert_eq!(page.pagination.count, 3);
}

#[test]
fn when_two_symbols_share_a_trading_date_each_keeps_its_own_row() {
    // Given: IBM and AAPL both traded on 2024-01-02
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let rows = vec![
        entry("IBM", "2024-01-02", "100", "101", "1000"),
        entry("AAPL", "2024-01-02", "180", "181", "9000"),
    ];

    // When: Both land in one batch
    let report = store.upsert_entries("run-1", &rows).expect("upsert");

    // Then: The key is (symbol, date), so neither displaced the other
    assert_eq!(report.inserted, 2);

    let ibm = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("ibm query");
    let aapl = store
        .query(&range("AAPL", "2024-01-01", "2024-01-31"))
        .expect("aapl query");
    assert_eq!(ibm.pagination.count, 1);
    assert_eq!(aapl.pagination.count, 1);
    assert_eq!(ibm.data[0].open_price, "100");
    assert_eq!(aapl.data[0].open_price, "180");
}

// =============================================================================
// Ingestion: Payload Pipeline
// =============================================================================

#[test]
fn when_payloads_are_normalized_the_recency_filter_keeps_newest_days() {
    // Given: A five-day payload
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let payload = daily_payload(
        "IBM",
        &[
            ("2024-01-01", "100", "101", "1000"),
            ("2024-01-02", "101", "102", "1100"),
            ("2024-01-03", "102", "103", "1200"),
            ("2024-01-04", "103", "104", "1300"),
            ("2024-01-05", "104", "105", "1400"),
        ],
    );

    // When: Normalization keeps the two most recent days and the result lands
    let entries = normalize(&batch_of(vec![("IBM", payload)]), Some(2));
    store.upsert_entries("run-1", &entries).expect("upsert");

    // Then: Only the two newest dates are stored
    let page = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("query");
    let dates: Vec<String> = page.data.iter().map(|row| row.date.to_string()).collect();
    assert_eq!(dates, ["2024-01-04", "2024-01-05"]);
}

#[test]
fn when_one_symbol_has_no_series_container_the_rest_still_land() {
    // Given: A healthy IBM payload next to an error-note payload for AAPL
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let healthy = daily_payload("IBM", &[("2024-01-02", "100", "101", "1000")]);
    let note_only = serde_json::json!({
        "Note": "Thank you for using Alpha Vantage! Our standard API rate limit applies."
    });

    // When: Both flow through normalization and land
    let entries = normalize(&batch_of(vec![("IBM", healthy), ("AAPL", note_only)]), None);
    let report = store.upsert_entries("run-1", &entries).expect("upsert");

    // Then: IBM landed and AAPL contributed nothing
    assert_eq!(report.inserted, 1);
    let miss = store.query(&range("AAPL", "2024-01-01", "2024-01-31"));
    assert!(matches!(miss, Err(QueryError::NotFound { .. })));
}

#[tokio::test]
async fn when_one_fetch_fails_the_surviving_symbols_still_land() {
    // Given: A provider that knows IBM but cannot reach AAPL
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let ibm_payload = daily_payload("IBM", &[("2024-01-02", "100", "101", "1000")]);
    let http = ScriptedHttpClient::new(&[("IBM", &ibm_payload)]);
    let client = AlphaVantageClient::new(Arc::new(http), "demo");
    let symbols = vec![
        Symbol::new("IBM").expect("symbol"),
        Symbol::new("AAPL").expect("symbol"),
    ];

    // When: The full fetch, normalize, upsert pipeline runs
    let batch = fetch_all(&client, &symbols).await;
    let entries = normalize(&batch, None);
    let report = store.upsert_entries("run-1", &entries).expect("upsert");

    // Then: The failed symbol is simply absent from the run
    assert_eq!(batch.len(), 1);
    assert_eq!(report.inserted, 1);

    let ibm = store
        .query(&range("IBM", "2024-01-01", "2024-01-31"))
        .expect("ibm query");
    assert_eq!(ibm.pagination.count, 1);

    let miss = store.query(&range("AAPL", "2024-01-01", "2024-01-31"));
    assert!(matches!(miss, Err(QueryError::NotFound { .. })));
}

#[test]
fn when_a_run_normalizes_to_nothing_the_schema_still_comes_up() {
    // Given: A payload with no usable days
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let note_only = serde_json::json!({ "Note": "rate limited" });

    // When: The empty result lands
    let entries = normalize(&batch_of(vec![("IBM", note_only)]), None);
    let report = store.upsert_entries("run-1", &entries).expect("upsert");

    // Then: Nothing was written, but the tables now exist, so a later
    // query reports not-found rather than a storage failure
    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 0);
    let miss = store.query(&range("IBM", "2024-01-01", "2024-01-31"));
    assert!(matches!(miss, Err(QueryError::NotFound { .. })));
}
