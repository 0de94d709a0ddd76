// src/test_support.rs
//! Shared fixtures for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::analysis::{AnalysisError, AnalysisRequest, OfferAnalyzer};
use crate::image_ingest::ImagePayload;
use crate::types::{AnalysisResult, Verdict};

pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub fn png_payload() -> ImagePayload {
    ImagePayload::from_bytes(PNG_BYTES).expect("fixture is a PNG header")
}

pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        offer_type: "Internship".to_string(),
        source_verification: "Posted on the company's careers page".to_string(),
        company_verification: "Company is registered and active".to_string(),
        internship_details_review: "Duration and stipend are typical".to_string(),
        red_flags_detected: vec![],
        credibility_score: 92,
        final_verdict: Verdict::Legit,
        safety_advice: vec!["Verify via official site.".to_string()],
        grounding_sources: None,
    }
}

/// In-process analyzer that counts calls, records requests, and can hold
/// each call open until released.
pub struct FakeAnalyzer {
    outcome: Result<AnalysisResult, AnalysisError>,
    calls: AtomicUsize,
    requests: std::sync::Mutex<Vec<AnalysisRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeAnalyzer {
    pub fn succeeding() -> Self {
        Self::with_outcome(Ok(sample_result()))
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self::with_outcome(Err(error))
    }

    pub fn with_outcome(outcome: Result<AnalysisResult, AnalysisError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            requests: std::sync::Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Calls block until `gate.notify_one()` is called
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OfferAnalyzer for FakeAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }
}

/// Polls until `analyzer` has seen `count` calls
pub async fn wait_for_calls(analyzer: &FakeAnalyzer, count: usize) {
    while analyzer.calls() < count {
        tokio::task::yield_now().await;
    }
}
