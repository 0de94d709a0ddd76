// src/report.rs
use crate::types::AnalysisResult;

/// Plain-text report of a finished analysis, in fixed field order
pub fn render_report(result: &AnalysisResult) -> String {
    let red_flags = if result.red_flags_detected.is_empty() {
        "None".to_string()
    } else {
        result.red_flags_detected.join(", ")
    };

    let lines = [
        format!("Offer Type: {}", result.offer_type),
        format!("Source Verification: {}", result.source_verification),
        format!("Company Verification: {}", result.company_verification),
        format!(
            "Internship Details Review: {}",
            result.internship_details_review
        ),
        format!("Red Flags Detected: {}", red_flags),
        format!("Credibility Score: {}", result.credibility_score),
        format!("Final Verdict: {}", result.final_verdict),
        format!(
            "Safety Advice for the User: {}",
            result.safety_advice.join(" ")
        ),
    ];

    lines.join("\n").trim().to_string()
}
