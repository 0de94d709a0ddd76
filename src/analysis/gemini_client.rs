// src/analysis/gemini_client.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

use super::response_parser::parse_response;
use super::{AnalysisError, AnalysisRequest, OfferAnalyzer};
use crate::core::config_manager::GeminiConfig;
use crate::types::gemini::{ApiErrorResponse, GenerateContentResponse};
use crate::types::AnalysisResult;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Long-lived client for the Gemini `generateContent` endpoint.
///
/// Built once at startup and shared by every session. A missing API key does
/// not prevent construction; it is reported through [`has_credentials`] and
/// every analysis fails fast with [`AnalysisError::MissingCredentials`].
///
/// [`has_credentials`]: GeminiClient::has_credentials
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let api_key = config.api_key.clone().filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("Gemini client built without an API key; analyses will fail until one is configured");
        }

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn call_generate_content(
        &self,
        api_key: &str,
        request: &AnalysisRequest,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let url = self.endpoint();
        let body = request.to_generate_request(self.temperature);

        info!(
            "Calling Gemini model {} for {} analysis",
            self.model,
            request.mode()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Service(format!("request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AnalysisError::Service(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&response_text) {
                Ok(api_error) => api_error.error.message,
                Err(_) => response_text,
            };
            error!("Gemini API error {}: {}", status, message);
            return Err(AnalysisError::Service(format!(
                "API returned error {}: {}",
                status, message
            )));
        }

        serde_json::from_str::<GenerateContentResponse>(&response_text).map_err(|e| {
            warn!("Unexpected Gemini response envelope: {}", e);
            AnalysisError::Parse(format!("unexpected response envelope: {}", e))
        })
    }
}

#[async_trait]
impl OfferAnalyzer for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AnalysisError::MissingCredentials)?;

        let response = self.call_generate_content(api_key, request).await?;
        let result = parse_response(&response)?;

        info!(
            "Gemini analysis completed: verdict {} with score {}",
            result.final_verdict, result.credibility_score
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-flash-latest".to_string(),
            // Nothing listens here; tests must never reach the network
            base_url: "http://127.0.0.1:9/".to_string(),
            temperature: 0.1,
            timeout_seconds: 1,
        }
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_slash() {
        let client = GeminiClient::new(&config(Some("key"))).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-flash-latest:generateContent"
        );
        assert_eq!(client.model(), "gemini-flash-latest");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(GeminiClient::new(&config(Some("key"))).unwrap().has_credentials());
        assert!(!GeminiClient::new(&config(Some("   "))).unwrap().has_credentials());
        assert!(!GeminiClient::new(&config(None)).unwrap().has_credentials());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GeminiClient::new(&config(None)).unwrap();
        let result = client
            .analyze(&AnalysisRequest::Text("offer".to_string()))
            .await;
        assert_eq!(result, Err(AnalysisError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_service_error() {
        let client = GeminiClient::new(&config(Some("key"))).unwrap();
        let result = client
            .analyze(&AnalysisRequest::Url("https://example.com".to_string()))
            .await;
        assert!(matches!(result, Err(AnalysisError::Service(_))));
    }
}
