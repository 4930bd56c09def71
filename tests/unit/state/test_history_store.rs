// Unit tests for the in-memory history store

use crate::common::{days_ago, hours_ago, make_record};
use prompt_firewall::core::models::PolicyAction;
use prompt_firewall::state::{HistoryStore, InMemoryHistoryStore};

#[tokio::test]
async fn test_history_is_most_recent_first() {
    let store = InMemoryHistoryStore::new();

    store
        .record(make_record(hours_ago(2), PolicyAction::Allow, false))
        .await
        .unwrap();
    store
        .record(make_record(hours_ago(1), PolicyAction::Block, false))
        .await
        .unwrap();

    let history = store.user_history("user-1", "tenant-a", 7).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].decision.decision, PolicyAction::Block);
    assert_eq!(history[1].decision.decision, PolicyAction::Allow);
}

#[tokio::test]
async fn test_history_is_scoped_to_user_and_tenant() {
    let store = InMemoryHistoryStore::new();

    store
        .record(make_record(hours_ago(1), PolicyAction::Allow, false))
        .await
        .unwrap();
    let mut other_user = make_record(hours_ago(1), PolicyAction::Allow, false);
    other_user.user_id = "user-2".to_string();
    store.record(other_user).await.unwrap();
    let mut other_tenant = make_record(hours_ago(1), PolicyAction::Allow, false);
    other_tenant.tenant_id = "tenant-b".to_string();
    store.record(other_tenant).await.unwrap();

    let history = store.user_history("user-1", "tenant-a", 7).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_records_older_than_window_are_filtered() {
    let store = InMemoryHistoryStore::new();

    store
        .record(make_record(days_ago(8), PolicyAction::Allow, false))
        .await
        .unwrap();
    store
        .record(make_record(days_ago(1), PolicyAction::Allow, false))
        .await
        .unwrap();

    let history = store.user_history("user-1", "tenant-a", 7).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_fetch_is_capped_at_1000_records() {
    let store = InMemoryHistoryStore::new();

    for _ in 0..1005 {
        store
            .record(make_record(hours_ago(1), PolicyAction::Allow, false))
            .await
            .unwrap();
    }

    let history = store.user_history("user-1", "tenant-a", 7).await.unwrap();
    assert_eq!(history.len(), 1000);
}
