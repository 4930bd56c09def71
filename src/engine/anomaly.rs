// Anomaly risk scoring over a bounded history window

use crate::core::errors::FirewallError;
use crate::core::models::{Decision, HistoryRecord, PolicyAction, RiskScore, Severity};
use crate::state::history_store::HistoryStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How many of the newest records the pattern-anomaly check compares
/// against the baseline rate.
const RECENT_WINDOW: usize = 10;

/// Computes a bounded composite risk score from the current decision plus a
/// time-windowed slice of the user's history. One bounded read against the
/// history collaborator per call, CPU-only otherwise.
pub struct AnomalyScorer {
    history: Arc<dyn HistoryStore>,
    window_days: i64,
}

impl AnomalyScorer {
    pub fn new(history: Arc<dyn HistoryStore>, window_days: i64) -> Self {
        Self {
            history,
            window_days,
        }
    }

    /// Score the current decision in the context of the user's recent
    /// history. Always in `0..=100`; a history-store failure propagates and
    /// the caller decides whether an unscored request is fatal.
    pub async fn calculate_risk_score(
        &self,
        user_id: &str,
        tenant_id: &str,
        current_decision: &Decision,
    ) -> Result<RiskScore, FirewallError> {
        let base: u32 = match current_decision.severity {
            Severity::Low => 10,
            Severity::Medium => 20,
            Severity::High => 30,
            Severity::Critical => 40,
        };

        let history = self
            .history
            .user_history(user_id, tenant_id, self.window_days)
            .await?;

        let frequency = Self::frequency_score(&history);
        let pattern = Self::pattern_score(&history);
        let violation = Self::violation_score(&history);

        debug!(
            user_id,
            tenant_id,
            base,
            frequency,
            pattern,
            violation,
            history_len = history.len(),
            "Risk score components"
        );

        let total = base + frequency + pattern + violation;
        Ok(total.min(100) as RiskScore)
    }

    /// Bucket history timestamps by the hour and score the busiest bucket.
    fn frequency_score(history: &[HistoryRecord]) -> u32 {
        if history.is_empty() {
            return 0;
        }

        let mut hourly_counts: HashMap<i64, u32> = HashMap::new();
        for record in history {
            let hour = record.timestamp.timestamp().div_euclid(3600);
            *hourly_counts.entry(hour).or_insert(0) += 1;
        }

        let max_hourly = hourly_counts.values().copied().max().unwrap_or(0);
        match max_hourly {
            m if m > 30 => 20,
            m if m > 20 => 10,
            m if m > 10 => 5,
            _ => 0,
        }
    }

    /// Compare the detection rate over the newest records against the
    /// whole-window baseline. Requires at least [`RECENT_WINDOW`] records;
    /// the store returns history most-recent-first, so the head of the list
    /// is the recent slice.
    fn pattern_score(history: &[HistoryRecord]) -> u32 {
        if history.len() < RECENT_WINDOW {
            return 0;
        }

        let detections = history.iter().filter(|r| !r.risks.is_empty()).count();
        let baseline_rate = detections as f64 / history.len() as f64;

        let recent = &history[..RECENT_WINDOW];
        let recent_detections = recent.iter().filter(|r| !r.risks.is_empty()).count();
        let recent_rate = recent_detections as f64 / recent.len() as f64;

        if recent_rate > baseline_rate * 2.0 && recent_rate > 0.5 {
            20
        } else if recent_rate > baseline_rate * 1.5 {
            10
        } else {
            0
        }
    }

    /// Weighted count of past enforcement actions: blocks count full,
    /// redactions half.
    fn violation_score(history: &[HistoryRecord]) -> u32 {
        if history.is_empty() {
            return 0;
        }

        let block_count = history
            .iter()
            .filter(|r| r.decision.decision == PolicyAction::Block)
            .count();
        let redact_count = history
            .iter()
            .filter(|r| r.decision.decision == PolicyAction::Redact)
            .count();

        let total_violations = block_count as f64 + redact_count as f64 * 0.5;

        if total_violations > 5.0 {
            20
        } else if total_violations >= 2.0 {
            10
        } else if total_violations > 0.0 {
            5
        } else {
            0
        }
    }
}
