// src/web/types.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisError;
use crate::image_ingest::ImageError;
use crate::session::{SessionError, SessionView};
use crate::types::InputMode;

pub type ApiError = (Status, Json<StandardErrorResponse>);
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SelectModeRequest {
    pub mode: InputMode,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SetInputRequest {
    pub value: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct DataUriRequest {
    pub data_uri: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub session: SessionView,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct HealthData {
    pub status: &'static str,
    pub credentials_configured: bool,
    pub model: String,
    pub active_sessions: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: impl Into<String>, error_code: &str, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error: error.into(),
            error_code: error_code.to_string(),
            suggestions,
        }
    }
}

pub fn api_error(
    status: Status,
    error: impl Into<String>,
    error_code: &str,
    suggestions: &[&str],
) -> ApiError {
    (
        status,
        Json(StandardErrorResponse::new(
            error,
            error_code,
            suggestions.iter().map(|s| s.to_string()).collect(),
        )),
    )
}

pub fn session_not_found(id: Uuid) -> ApiError {
    api_error(
        Status::NotFound,
        format!("Session '{}' not found", id),
        "SESSION_NOT_FOUND",
        &["Create a new session with POST /api/sessions"],
    )
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match &err {
            SessionError::Validation(message) => api_error(
                Status::BadRequest,
                message.clone(),
                "VALIDATION_ERROR",
                &["Paste the offer text, upload an image, or enter a URL first"],
            ),
            SessionError::InFlight => api_error(
                Status::Conflict,
                err.to_string(),
                "ANALYSIS_IN_PROGRESS",
                &["Wait for the current analysis to finish"],
            ),
            SessionError::ModeMismatch(_) => api_error(
                Status::BadRequest,
                err.to_string(),
                "MODE_MISMATCH",
                &["Select the matching input mode first"],
            ),
            SessionError::Superseded => api_error(
                Status::Conflict,
                err.to_string(),
                "ANALYSIS_SUPERSEDED",
                &["Start a new analysis for the current input"],
            ),
            SessionError::Analysis(cause) => api_error(
                Status::BadGateway,
                err.to_string(),
                cause.code(),
                analysis_suggestions(cause),
            ),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        api_error(
            Status::BadRequest,
            err.to_string(),
            err.code(),
            &[err.suggestion()],
        )
    }
}

fn analysis_suggestions(err: &AnalysisError) -> &'static [&'static str] {
    match err {
        AnalysisError::MissingCredentials => &[
            "The AI analysis service is not configured",
            "Contact system administrator",
        ],
        AnalysisError::Service(_) => &[
            "The AI analysis service is temporarily unavailable",
            "Try again in a few moments",
        ],
        AnalysisError::Parse(_) => &[
            "The AI analysis service returned an unexpected answer",
            "Try again in a few moments",
        ],
    }
}
