//! Shared fixtures for scope integration tests
//!
//! Mirrors the recipient communication log list: four logs attached to one
//! recipient, written by two users, plus one log attached to a different
//! recipient that every query must leave out.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod scope_harness;
//! use scope_harness::*;
//! ```

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Once;

use scopes::core::predicate::Scope;
use scopes::core::query::{Direction, PageRequest};
use scopes::core::store::ScopedStore;
use scopes::domains::communication_log;
use scopes::storage::InMemoryRecordStore;

pub const RECIPIENT_ID: i64 = 7;
pub const IGNORED_RECIPIENT_ID: i64 = 8;
pub const REGION_ID: i64 = 14;

pub const USER_ID: i64 = 101;
pub const USER_NAME: &str = "Jordan Fieldworker";
pub const SECOND_USER_ID: i64 = 102;
pub const SECOND_USER_NAME: &str = "Timothy Blankenship";

pub const RESULTS: [&str; 2] = ["New TTA accepted", "RTTAPA declined"];
pub const METHODS: [&str; 2] = ["Email", "Phone"];
pub const PURPOSES: [&str; 2] = ["Monitoring", "New TTA"];

/// Install a test subscriber once; `RUST_LOG=scopes=debug` shows skipped filters
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn log(id: i64, user_id: i64, user_name: &str, recipient_id: i64, data: Value) -> Value {
    let mut defaults = json!({
        "communicationDate": "2023/01/01",
        "result": RESULTS[0],
        "method": METHODS[0],
        "purpose": PURPOSES[0],
    });
    if let (Some(base), Value::Object(overrides)) = (defaults.as_object_mut(), data) {
        base.extend(overrides);
    }

    json!({
        "id": id,
        "userId": user_id,
        "author": {"id": user_id, "name": user_name, "homeRegionId": REGION_ID},
        "recipients": [{"id": recipient_id}],
        "data": defaults,
    })
}

/// The four logs of the recipient under test, then the ignored one
pub fn communication_logs() -> Vec<Value> {
    vec![
        log(1, USER_ID, USER_NAME, RECIPIENT_ID, json!({"communicationDate": "2022/12/01"})),
        log(2, USER_ID, USER_NAME, RECIPIENT_ID, json!({"result": RESULTS[1]})),
        log(
            3,
            USER_ID,
            USER_NAME,
            RECIPIENT_ID,
            json!({"method": METHODS[1], "purpose": PURPOSES[1]}),
        ),
        log(4, SECOND_USER_ID, SECOND_USER_NAME, RECIPIENT_ID, json!({})),
        log(5, USER_ID, USER_NAME, IGNORED_RECIPIENT_ID, json!({})),
    ]
}

pub fn log_store() -> InMemoryRecordStore {
    init_tracing();
    InMemoryRecordStore::with_records(communication_logs())
}

/// Logs for the recipient under test matching `scope`, newest first
pub async fn logs_by_recipient_and_scopes(
    store: &InMemoryRecordStore,
    recipient_id: i64,
    scope: Scope,
) -> (Vec<Value>, usize) {
    let scope = Scope::and([communication_log::for_recipient(recipient_id), scope]);
    let request = PageRequest::default().sort_by("data.communicationDate", Direction::Desc);
    let page = store.find_page(&scope, &request).await.unwrap();
    (page.rows, page.count)
}

pub fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|r| r["id"].as_i64()).collect()
}
