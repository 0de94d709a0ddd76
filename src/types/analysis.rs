// src/types/analysis.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the submitted offer content should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Image,
    Url,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "url" => Ok(Self::Url),
            other => Err(format!("Unsupported input mode: {}. Use text, image or url", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Legit,
    Suspicious,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legit => "Legit",
            Self::Suspicious => "Suspicious",
            Self::Fake => "Fake",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A web page the model cited while researching the offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Structured verdict for one analyzed offer.
///
/// Built once per analysis and never mutated afterwards; a new submission
/// or a reset replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub offer_type: String,
    pub source_verification: String,
    pub company_verification: String,
    pub internship_details_review: String,
    pub red_flags_detected: Vec<String>,
    pub credibility_score: i64,
    pub final_verdict: Verdict,
    pub safety_advice: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_mode_from_str() {
        assert_eq!("text".parse::<InputMode>(), Ok(InputMode::Text));
        assert_eq!(" IMAGE ".parse::<InputMode>(), Ok(InputMode::Image));
        assert_eq!("Url".parse::<InputMode>(), Ok(InputMode::Url));
        assert!("pdf".parse::<InputMode>().is_err());
    }

    #[test]
    fn test_input_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&InputMode::Url).unwrap(), "\"url\"");
        let mode: InputMode = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(mode, InputMode::Image);
    }

    #[test]
    fn test_result_serializes_camel_case_without_empty_sources() {
        let result = AnalysisResult {
            offer_type: "Internship".to_string(),
            source_verification: "ok".to_string(),
            company_verification: "ok".to_string(),
            internship_details_review: "ok".to_string(),
            red_flags_detected: vec![],
            credibility_score: 90,
            final_verdict: Verdict::Legit,
            safety_advice: vec![],
            grounding_sources: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["offerType"], "Internship");
        assert_eq!(value["finalVerdict"], "Legit");
        assert_eq!(value["credibilityScore"], 90);
        assert!(value.get("groundingSources").is_none());
    }
}
