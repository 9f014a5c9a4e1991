use super::*;
use crate::clock::ManualClock;
use chrono::TimeZone;
use std::sync::Arc;

fn store() -> (Arc<ManualClock>, MemoryKvStore) {
    let clock = Arc::new(ManualClock::new(chrono::Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()));
    let store = MemoryKvStore::new(clock.clone());
    (clock, store)
}

#[tokio::test]
async fn put_then_get_returns_value() {
    let (_clock, store) = store();
    store.put("k", "v", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn missing_key_reads_none() {
    let (_clock, store) = store();
    assert!(store.get("absent").await.unwrap().is_none());
}

#[tokio::test]
async fn put_replaces_existing_value() {
    let (_clock, store) = store();
    store.put("k", "one", None).await.unwrap();
    store.put("k", "two", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn ttl_entry_expires_when_clock_passes_deadline() {
    let (clock, store) = store();
    store
        .put("k", "v", Some(Duration::from_secs(60)))
        .await
        .unwrap();
    clock.advance(Duration::from_secs(59));
    assert!(store.get("k").await.unwrap().is_some());
    clock.advance(Duration::from_secs(1));
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_key_and_tolerates_missing() {
    let (_clock, store) = store();
    store.put("k", "v", None).await.unwrap();
    store.delete("k").await.unwrap();
    store.delete("k").await.unwrap();
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn json_helpers_round_trip() {
    let (_clock, store) = store();
    put_json(&store, "j", &serde_json::json!({ "count": 3 }), None)
        .await
        .unwrap();
    let value: serde_json::Value = get_json(&store, "j").await.unwrap().unwrap();
    assert_eq!(value["count"], 3);
}

#[tokio::test]
async fn get_json_reports_decode_error() {
    let (_clock, store) = store();
    store.put("bad", "not json", None).await.unwrap();
    let err = get_json::<serde_json::Value>(&store, "bad")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "bad"));
}
