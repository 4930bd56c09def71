// Orchestrator - concurrent detector fan-out, merge, policy resolution

use crate::core::errors::FirewallError;
use crate::core::models::{Decision, Policy, PolicyType};
use crate::engine::custom::CustomDetector;
use crate::engine::injection::InjectionDetector;
use crate::engine::patterns::InjectionPatterns;
use crate::engine::pii::PiiDetector;
use crate::engine::policy::PolicyEngine;
use crate::recognizer::EntityRecognizer;
use std::sync::Arc;
use tracing::{debug, info};

/// Front door of the detection-and-decision pipeline.
///
/// Holds the three detectors behind `Arc` so one immutable instance serves
/// all concurrent requests; each analysis call is otherwise stateless.
pub struct PromptFirewall {
    pii: Arc<PiiDetector>,
    injection: Arc<InjectionDetector>,
    custom: Arc<CustomDetector>,
}

impl PromptFirewall {
    /// Build the firewall, compiling the shared pattern library once.
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        min_entity_confidence: f64,
    ) -> Result<Self, FirewallError> {
        let patterns = Arc::new(InjectionPatterns::compile()?);
        Ok(Self {
            pii: Arc::new(PiiDetector::new(recognizer, min_entity_confidence)),
            injection: Arc::new(InjectionDetector::new(patterns)),
            custom: Arc::new(CustomDetector::new()),
        })
    }

    /// Analyze one prompt (and optional response) under a tenant's policies.
    ///
    /// The three prompt-side detectors run concurrently and are joined
    /// before policy resolution; no partial results are acted upon. A
    /// non-empty response gets a second PII pass only — the response is
    /// untrusted for data leakage, not for attacking the system, so it is
    /// never scanned for injection or custom patterns. Any detector failure
    /// aborts the whole call.
    pub async fn analyze_request(
        &self,
        prompt: &str,
        response: &str,
        policies: &[Policy],
    ) -> Result<Decision, FirewallError> {
        let custom_policies: Vec<Policy> = policies
            .iter()
            .filter(|p| p.kind == PolicyType::Custom)
            .cloned()
            .collect();

        debug!(
            policy_count = policies.len(),
            custom_count = custom_policies.len(),
            prompt_len = prompt.len(),
            "Starting detector fan-out"
        );

        let pii_task = tokio::spawn({
            let detector = Arc::clone(&self.pii);
            let text = prompt.to_string();
            async move { detector.detect(&text).await }
        });
        let injection_task = tokio::task::spawn_blocking({
            let detector = Arc::clone(&self.injection);
            let text = prompt.to_string();
            move || detector.detect(&text)
        });
        let custom_task = tokio::task::spawn_blocking({
            let detector = Arc::clone(&self.custom);
            let text = prompt.to_string();
            move || detector.detect(&text, &custom_policies)
        });

        let (pii_result, injection_findings, custom_findings) =
            tokio::try_join!(pii_task, injection_task, custom_task)
                .map_err(|e| FirewallError::DetectorFailure(format!("Detector task failed: {}", e)))?;
        let mut pii_findings = pii_result?;

        if !response.is_empty() {
            let response_findings = self.pii.detect(response).await?;
            pii_findings.extend(response_findings);
        }

        info!(
            pii_count = pii_findings.len(),
            injection_count = injection_findings.len(),
            custom_count = custom_findings.len(),
            "Detectors joined"
        );

        Ok(PolicyEngine::evaluate(
            prompt,
            response,
            pii_findings,
            injection_findings,
            custom_findings,
            policies,
        ))
    }
}
