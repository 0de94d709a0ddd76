// src/analysis/request.rs
use crate::image_ingest::ImagePayload;
use crate::types::gemini::{
    Content, GenerateContentRequest, GenerationConfig, GoogleSearch, InlineData, Part, Tool,
};
use crate::types::InputMode;

/// One offer submission, already validated by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text(String),
    Image(ImagePayload),
    Url(String),
}

impl AnalysisRequest {
    pub fn mode(&self) -> InputMode {
        match self {
            Self::Text(_) => InputMode::Text,
            Self::Image(_) => InputMode::Image,
            Self::Url(_) => InputMode::Url,
        }
    }

    fn content_line(&self) -> String {
        match self {
            Self::Text(text) => format!("Content provided: {}", text),
            Self::Image(image) => format!(
                "Content provided: the attached offer image ({})",
                image.mime_type
            ),
            Self::Url(url) => format!("URL to investigate: {}", url),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            r#"You are an AI Scam Detection Analyst specialized in identifying fake internship and job offers.
Your task is to analyze the provided input and determine if it's a scam.

Input Content: {}

Follow this workflow:
1. Identify input type.
2. Confirm if it's an internship/job offer.
3. Verify source (official domain, website legitimacy).
4. Analyze details (role, duration, stipend).
5. Check skill matching.
6. Evaluate interview process.
7. Verify online presence (LinkedIn, Glassdoor).
8. Check HR info.
9. Detect red flags (money requests, urgency, etc).
10. Calculate score (Start at 100).

Deduction Rules:
- No official email domain: -15
- No company website: -20
- Asking for money or fees: -40
- No interview process: -20
- Unrealistic stipend or role: -15
- No online presence: -25
- Poor formatting or missing information: -10

Classification:
- 80–100 -> Legit
- 50–79 -> Suspicious
- < 50 -> Fake

Return the analysis in JSON format only with the following structure:
{{
  "offerType": "string",
  "sourceVerification": "string",
  "companyVerification": "string",
  "internshipDetailsReview": "string",
  "redFlagsDetected": ["string"],
  "credibilityScore": number,
  "finalVerdict": "Legit" | "Suspicious" | "Fake",
  "safetyAdvice": ["string"]
}}"#,
            self.content_line()
        )
    }

    /// Builds the complete `generateContent` body for this submission
    pub fn to_generate_request(&self, temperature: f32) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: self.prompt(),
        }];

        if let Self::Image(image) = self {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.to_string(),
                    data: image.data.clone(),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            tools: vec![Tool {
                google_search: GoogleSearch::default(),
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_payload() -> ImagePayload {
        ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap()
    }

    #[test]
    fn test_prompt_labels_content_per_mode() {
        let text = AnalysisRequest::Text("Pay 500 to join".to_string()).prompt();
        assert!(text.contains("Input Content: Content provided: Pay 500 to join"));

        let url = AnalysisRequest::Url("https://jobs.example.com/42".to_string()).prompt();
        assert!(url.contains("Input Content: URL to investigate: https://jobs.example.com/42"));

        let image = AnalysisRequest::Image(jpeg_payload()).prompt();
        assert!(image.contains("the attached offer image (image/jpeg)"));
        assert!(!image.contains(&jpeg_payload().data));
    }

    #[test]
    fn test_prompt_carries_rubric() {
        let prompt = AnalysisRequest::Text("offer".to_string()).prompt();
        for rule in [
            "No official email domain: -15",
            "No company website: -20",
            "Asking for money or fees: -40",
            "No interview process: -20",
            "Unrealistic stipend or role: -15",
            "No online presence: -25",
            "Poor formatting or missing information: -10",
            "80–100 -> Legit",
            "50–79 -> Suspicious",
            "< 50 -> Fake",
        ] {
            assert!(prompt.contains(rule), "missing rubric line: {}", rule);
        }
        assert!(prompt.contains("\"finalVerdict\": \"Legit\" | \"Suspicious\" | \"Fake\""));
    }

    #[test]
    fn test_text_request_body() {
        let body = AnalysisRequest::Text("offer".to_string()).to_generate_request(0.1);
        let value = serde_json::to_value(&body).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0]["text"].as_str().unwrap().contains("offer"));
        assert_eq!(value["tools"], serde_json::json!([{ "googleSearch": {} }]));
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!(value["contents"][0].get("role").is_none());
    }

    #[test]
    fn test_image_request_attaches_inline_data() {
        let payload = jpeg_payload();
        let body = AnalysisRequest::Image(payload.clone()).to_generate_request(0.1);
        let value = serde_json::to_value(&body).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], payload.data.as_str());
    }

    #[test]
    fn test_url_request_has_no_attachment() {
        let request = AnalysisRequest::Url("https://example.com".to_string());
        assert_eq!(request.mode(), InputMode::Url);
        let body = request.to_generate_request(0.1);
        assert_eq!(body.contents[0].parts.len(), 1);
    }
}
