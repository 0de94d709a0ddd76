// src/analysis/mod.rs
use async_trait::async_trait;
use thiserror::Error;

pub mod gemini_client;
pub mod request;
pub mod response_parser;

pub use gemini_client::GeminiClient;
pub use request::AnalysisRequest;

use crate::types::AnalysisResult;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Gemini API key is not configured")]
    MissingCredentials,
    #[error("AI service request failed: {0}")]
    Service(String),
    #[error("AI service response could not be parsed: {0}")]
    Parse(String),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::Service(_) => "SERVICE_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
        }
    }
}

/// Anything that can turn one offer submission into a verdict.
///
/// The production implementation is [`GeminiClient`]; controllers only see
/// this trait so a single long-lived client can be shared by every session.
#[async_trait]
pub trait OfferAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}
