// src/analysis/response_parser.rs
//! Turns a raw `generateContent` response into a validated [`AnalysisResult`]

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::AnalysisError;
use crate::types::gemini::{GenerateContentResponse, GroundingChunk};
use crate::types::{AnalysisResult, GroundingSource, Verdict};

const DEFAULT_SOURCE_TITLE: &str = "External Source";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("code fence pattern is valid")
});

/// The JSON object the model is told to return. Every field is required;
/// serde rejects missing or mistyped ones instead of filling defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Assessment {
    offer_type: String,
    source_verification: String,
    company_verification: String,
    internship_details_review: String,
    red_flags_detected: Vec<String>,
    credibility_score: i64,
    final_verdict: Verdict,
    safety_advice: Vec<String>,
}

/// Removes a surrounding Markdown code fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    if raw.contains("```") {
        if let Some(inner) = CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
            return inner.as_str().trim();
        }
    }
    raw.trim()
}

pub fn parse_assessment(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = strip_code_fence(raw);
    if json.is_empty() {
        return Err(AnalysisError::Parse("empty response text".to_string()));
    }

    let assessment: Assessment =
        serde_json::from_str(json).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    if !(0..=100).contains(&assessment.credibility_score) {
        warn!(
            "Model returned credibility score {} outside 0-100, passing through",
            assessment.credibility_score
        );
    }

    Ok(AnalysisResult {
        offer_type: assessment.offer_type,
        source_verification: assessment.source_verification,
        company_verification: assessment.company_verification,
        internship_details_review: assessment.internship_details_review,
        red_flags_detected: assessment.red_flags_detected,
        credibility_score: assessment.credibility_score,
        final_verdict: assessment.final_verdict,
        safety_advice: assessment.safety_advice,
        grounding_sources: None,
    })
}

pub fn extract_grounding_sources(chunks: &[GroundingChunk]) -> Vec<GroundingSource> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .map(|web| GroundingSource {
            title: web
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
            uri: web.uri.clone().unwrap_or_default(),
        })
        .collect()
}

pub fn parse_response(response: &GenerateContentResponse) -> Result<AnalysisResult, AnalysisError> {
    let text = response
        .text()
        .ok_or_else(|| AnalysisError::Parse("response contained no text".to_string()))?;

    let mut result = parse_assessment(&text)?;

    if let Some(chunks) = response.grounding_chunks() {
        let sources = extract_grounding_sources(chunks);
        debug!("Extracted {} grounding sources", sources.len());
        result.grounding_sources = Some(sources);
    }

    Ok(result)
}
