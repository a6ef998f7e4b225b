use std::sync::Arc;

use bankfetch_core::balances::BALANCE_HISTORY_INDEX;
use bankfetch_core::store::{selector, DocumentStore, Stored};
use bankfetch_core::{Account, BalanceHistoryService};
use bankfetch_storage_sqlite::open_store;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> String {
    dir.path()
        .join("nested")
        .join("bankfetch.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::test]
async fn test_upsert_updates_matching_documents() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&db_path(&dir)).unwrap();

    let first = store
        .upsert(
            "bank.accounts",
            vec![
                json!({"number": "1", "balance": 10.0}),
                json!({"number": "2", "balance": 20.0}),
            ],
            &["number"],
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    let id = first[0]["_id"].as_str().unwrap().to_string();

    let second = store
        .upsert(
            "bank.accounts",
            vec![json!({"number": "1", "balance": 15.5})],
            &["number"],
        )
        .await
        .unwrap();
    assert_eq!(second[0]["_id"], json!(id));
    assert_eq!(second[0]["balance"], json!(15.5));
    assert_eq!(store.count("bank.accounts").unwrap(), 2);
}

#[tokio::test]
async fn test_upsert_rewrites_body_within_its_collection_only() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&db_path(&dir)).unwrap();

    store
        .upsert("bank.accounts", vec![json!({"number": "1", "label": "old"})], &["number"])
        .await
        .unwrap();
    store
        .upsert("bank.other", vec![json!({"number": "1", "label": "other"})], &["number"])
        .await
        .unwrap();

    store
        .upsert("bank.accounts", vec![json!({"number": "1", "label": "new"})], &["number"])
        .await
        .unwrap();

    let found = store
        .indexed_query("bank.accounts", &["number"], &selector([("number", json!("1"))]), 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["label"], json!("new"));

    let untouched = store
        .indexed_query("bank.other", &["number"], &selector([("number", json!("1"))]), 10)
        .await
        .unwrap();
    assert_eq!(untouched[0]["label"], json!("other"));
    assert_eq!(store.count("bank.accounts").unwrap(), 1);
    assert_eq!(store.count("bank.other").unwrap(), 1);
}

#[tokio::test]
async fn test_append_never_merges() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&db_path(&dir)).unwrap();

    let row = json!({"account": "a", "amount": -3.2, "label": "CB CAFE"});
    store.append("bank.operations", vec![row.clone()]).await.unwrap();
    store.append("bank.operations", vec![row]).await.unwrap();

    assert_eq!(store.count("bank.operations").unwrap(), 2);
    assert_eq!(store.count("bank.accounts").unwrap(), 0);
}

#[tokio::test]
async fn test_indexed_query_filters_and_limits() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&db_path(&dir)).unwrap();

    store
        .append(
            "bank.balancehistories",
            vec![
                json!({"year": 2025, "relationships": {"account": {"data": {"_id": "a"}}}}),
                json!({"year": 2026, "relationships": {"account": {"data": {"_id": "a"}}}}),
                json!({"year": 2026, "relationships": {"account": {"data": {"_id": "b"}}}}),
            ],
        )
        .await
        .unwrap();

    let query = selector([
        ("year", json!(2026)),
        ("relationships.account.data._id", json!("a")),
    ]);
    let found = store
        .indexed_query("bank.balancehistories", &BALANCE_HISTORY_INDEX, &query, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0]["_id"].is_string());

    let by_year = selector([("year", json!(2026))]);
    let limited = store
        .indexed_query("bank.balancehistories", &BALANCE_HISTORY_INDEX, &by_year, 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_indexed_query_rejects_fields_outside_index() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&db_path(&dir)).unwrap();

    let query = selector([("label", json!("x"))]);
    let result = store
        .indexed_query("bank.balancehistories", &BALANCE_HISTORY_INDEX, &query, 1)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_balance_history_accumulates_across_runs() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&db_path(&dir)).unwrap());
    let service = BalanceHistoryService::new(store.clone());

    let account = Stored {
        id: "acc-1".to_string(),
        record: Account::new("LIVRET A", "111", dec!(100.00), "tok"),
    };
    let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    service.accumulate(&[account.clone()], monday).await.unwrap();

    let mut later = account;
    later.record.balance = dec!(120.50);
    let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
    let histories = service.accumulate(&[later], tuesday).await.unwrap();

    assert_eq!(store.count("bank.balancehistories").unwrap(), 1);
    let history = &histories[0];
    assert_eq!(history.balance_on(monday), Some(dec!(100.00)));
    assert_eq!(history.balance_on(tuesday), Some(dec!(120.50)));
}
