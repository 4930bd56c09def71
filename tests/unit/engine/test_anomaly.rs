// Unit tests for the anomaly risk scorer

use crate::common::{days_ago, hours_ago, make_decision, make_record};
use prompt_firewall::core::models::{PolicyAction, Severity};
use prompt_firewall::engine::anomaly::AnomalyScorer;
use prompt_firewall::state::{HistoryStore, InMemoryHistoryStore};
use std::sync::Arc;

const WINDOW_DAYS: i64 = 7;

async fn scorer_with(records: Vec<prompt_firewall::core::models::HistoryRecord>) -> AnomalyScorer {
    let store = Arc::new(InMemoryHistoryStore::new());
    // record() pushes to the front, so insert oldest first to end up
    // most-recent-first
    for record in records {
        store.record(record).await.unwrap();
    }
    AnomalyScorer::new(store, WINDOW_DAYS)
}

#[tokio::test]
async fn test_empty_history_scores_base_only() {
    let scorer = scorer_with(vec![]).await;
    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    assert_eq!(score, 10);
}

#[tokio::test]
async fn test_base_score_follows_severity() {
    let scorer = scorer_with(vec![]).await;
    let cases = [
        (Severity::Low, 10),
        (Severity::Medium, 20),
        (Severity::High, 30),
        (Severity::Critical, 40),
    ];
    for (severity, expected) in cases {
        let score = scorer
            .calculate_risk_score("user-1", "tenant-a", &make_decision(severity))
            .await
            .unwrap();
        assert_eq!(score, expected);
    }
}

#[tokio::test]
async fn test_burst_of_same_hour_requests_scores_frequency_20() {
    // 35 records in the same hour, no risks, no violations
    let records = (0..35)
        .map(|_| make_record(hours_ago(0), PolicyAction::Allow, false))
        .collect();
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    // base 10 + frequency 20
    assert_eq!(score, 30);
}

#[tokio::test]
async fn test_frequency_bands() {
    // 15 in one hour -> band ">10" -> 5
    let records = (0..15)
        .map(|_| make_record(hours_ago(0), PolicyAction::Allow, false))
        .collect();
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    // base 10 + frequency 5; 15 records all clean, pattern needs a rate shift
    assert_eq!(score, 15);
}

#[tokio::test]
async fn test_two_blocks_score_violation_10() {
    let records = vec![
        make_record(hours_ago(30), PolicyAction::Block, false),
        make_record(hours_ago(20), PolicyAction::Block, false),
        make_record(hours_ago(10), PolicyAction::Allow, false),
    ];
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    // base 10 + violations 10 (2 blocks -> band ">=2")
    assert_eq!(score, 20);
}

#[tokio::test]
async fn test_redactions_count_half() {
    // 3 redacts = 1.5 violations -> band ">0" -> 5
    let records = vec![
        make_record(hours_ago(30), PolicyAction::Redact, false),
        make_record(hours_ago(20), PolicyAction::Redact, false),
        make_record(hours_ago(10), PolicyAction::Redact, false),
    ];
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    assert_eq!(score, 15);
}

#[tokio::test]
async fn test_recent_detection_spike_scores_pattern_20() {
    // 30 old clean records, then 10 recent ones all with risks:
    // baseline 10/40 = 0.25, recent 1.0 > 2x baseline and > 0.5
    let mut records: Vec<_> = (0..30)
        .map(|i| make_record(hours_ago(100 + i), PolicyAction::Allow, false))
        .collect();
    records.extend((0..10).map(|i| make_record(hours_ago(10 + i), PolicyAction::Allow, true)));
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    // base 10 + pattern 20; spread over distinct hours so frequency stays 0
    assert_eq!(score, 30);
}

#[tokio::test]
async fn test_fewer_than_ten_records_never_score_pattern() {
    let records: Vec<_> = (0..9)
        .map(|i| make_record(hours_ago(10 + i), PolicyAction::Allow, true))
        .collect();
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    assert_eq!(score, 10);
}

#[tokio::test]
async fn test_score_is_clamped_to_100() {
    // Saturate every component: 40 same-hour records, 30 old clean + 10
    // recent risky, 6+ blocks
    let mut records: Vec<_> = (0..30)
        .map(|_| make_record(hours_ago(0), PolicyAction::Block, false))
        .collect();
    records.extend((0..10).map(|_| make_record(hours_ago(0), PolicyAction::Block, true)));
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Critical))
        .await
        .unwrap();
    assert_eq!(score, 100);
}

#[tokio::test]
async fn test_records_outside_window_are_ignored() {
    let records = vec![
        make_record(days_ago(8), PolicyAction::Block, false),
        make_record(days_ago(9), PolicyAction::Block, false),
    ];
    let scorer = scorer_with(records).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    // Both blocks are stale; only the base score remains
    assert_eq!(score, 10);
}

#[tokio::test]
async fn test_other_users_history_does_not_bleed_in() {
    let mut record = make_record(hours_ago(1), PolicyAction::Block, false);
    record.user_id = "someone-else".to_string();
    let scorer = scorer_with(vec![record]).await;

    let score = scorer
        .calculate_risk_score("user-1", "tenant-a", &make_decision(Severity::Low))
        .await
        .unwrap();
    assert_eq!(score, 10);
}
