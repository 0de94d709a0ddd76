// src/session.rs
//! Per-session input/result state machine.
//!
//! `Session` is plain data with synchronous transitions. The async
//! orchestration around the analyzer lives in [`crate::controller`], which
//! takes the session lock only to move between states and never across the
//! network call.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::analysis::{AnalysisError, AnalysisRequest};
use crate::image_ingest::ImagePayload;
use crate::report::render_report;
use crate::types::{AnalysisResult, InputMode};

pub const EMPTY_INPUT_MESSAGE: &str = "Please provide content to analyze.";
pub const MISSING_IMAGE_MESSAGE: &str = "Please upload an image of the offer.";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Analysis failed. Please check your connection and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("An analysis is already in progress")]
    InFlight,
    #[error("Operation not available in {0} mode")]
    ModeMismatch(InputMode),
    #[error("Analysis result discarded because the session changed while it was running")]
    Superseded,
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Analysis(#[source] AnalysisError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LastError {
    Validation(&'static str),
    Analysis,
}

impl LastError {
    fn message(&self) -> &'static str {
        match self {
            Self::Validation(message) => *message,
            Self::Analysis => ANALYSIS_FAILED_MESSAGE,
        }
    }
}

/// Ticket for one outbound call, handed back to [`Session::settle`]
#[derive(Debug)]
pub struct PendingAnalysis {
    pub request: AnalysisRequest,
    generation: u64,
}

impl PendingAnalysis {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Serializable view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub mode: InputMode,
    pub phase: Phase,
    pub input: String,
    pub image_preview: Option<String>,
    pub is_analyzing: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    mode: InputMode,
    input: String,
    image: Option<ImagePayload>,
    in_flight: bool,
    // Bumped by every reset so a late outcome can tell it is stale
    generation: u64,
    result: Option<AnalysisResult>,
    last_error: Option<LastError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Switches mode and clears input, preview, result and error
    pub fn select_mode(&mut self, mode: InputMode) {
        debug!("Selecting {} mode", mode);
        self.mode = mode;
        self.clear();
    }

    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.input.clear();
        self.image = None;
        self.result = None;
        self.last_error = None;
        self.generation += 1;
    }

    pub fn set_input(&mut self, value: impl Into<String>) -> Result<(), SessionError> {
        if self.mode == InputMode::Image {
            return Err(SessionError::ModeMismatch(self.mode));
        }
        self.input = value.into();
        Ok(())
    }

    pub fn load_image(&mut self, image: ImagePayload) -> Result<(), SessionError> {
        if self.mode != InputMode::Image {
            return Err(SessionError::ModeMismatch(self.mode));
        }
        debug!("Loaded {} image ({} bytes)", image.mime_type, image.byte_len);
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Validates the current input and moves to Pending.
    ///
    /// Rejected while another call is outstanding; on empty input the
    /// validation error is recorded and no request is produced.
    pub fn begin(&mut self) -> Result<PendingAnalysis, SessionError> {
        if self.in_flight {
            return Err(SessionError::InFlight);
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(message) => {
                self.result = None;
                self.last_error = Some(LastError::Validation(message));
                return Err(SessionError::Validation(message.to_string()));
            }
        };

        self.in_flight = true;
        self.result = None;
        self.last_error = None;
        info!("Starting {} analysis", self.mode);

        Ok(PendingAnalysis {
            request,
            generation: self.generation,
        })
    }

    fn build_request(&self) -> Result<AnalysisRequest, &'static str> {
        match self.mode {
            InputMode::Text | InputMode::Url if self.input.trim().is_empty() => {
                Err(EMPTY_INPUT_MESSAGE)
            }
            InputMode::Text => Ok(AnalysisRequest::Text(self.input.clone())),
            InputMode::Url => Ok(AnalysisRequest::Url(self.input.trim().to_string())),
            InputMode::Image => self
                .image
                .clone()
                .map(AnalysisRequest::Image)
                .ok_or(MISSING_IMAGE_MESSAGE),
        }
    }

    /// Records the outcome of the call started by `pending`
    pub fn settle(
        &mut self,
        pending: PendingAnalysis,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Result<AnalysisResult, SessionError> {
        self.in_flight = false;

        if pending.generation != self.generation {
            debug!("Discarding outcome of a superseded analysis");
            return Err(SessionError::Superseded);
        }

        match outcome {
            Ok(result) => {
                info!(
                    "Analysis settled: {} ({})",
                    result.final_verdict, result.credibility_score
                );
                self.result = Some(result.clone());
                self.last_error = None;
                Ok(result)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.result = None;
                self.last_error = Some(LastError::Analysis);
                Err(SessionError::Analysis(e))
            }
        }
    }

    /// Settles a call whose ticket was lost, e.g. when the task running it
    /// panicked
    pub fn abandon(
        &mut self,
        generation: u64,
        cause: AnalysisError,
    ) -> Result<AnalysisResult, SessionError> {
        self.settle(
            PendingAnalysis {
                request: AnalysisRequest::Text(String::new()),
                generation,
            },
            Err(cause),
        )
    }

    pub fn report(&self) -> Option<String> {
        self.result.as_ref().map(render_report)
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Pending
        } else if self.result.is_some() {
            Phase::Success
        } else if self.last_error == Some(LastError::Analysis) {
            Phase::Error
        } else {
            Phase::Idle
        }
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            phase: self.phase(),
            input: self.input.clone(),
            image_preview: self.image.as_ref().map(ImagePayload::preview_uri),
            is_analyzing: self.in_flight,
            result: self.result.clone(),
            error: self.last_error.as_ref().map(|e| e.message().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png_payload, sample_result};

    fn text_session(input: &str) -> Session {
        let mut session = Session::new();
        session.set_input(input).unwrap();
        session
    }

    #[test]
    fn test_initial_state_is_idle_text() {
        let view = Session::new().snapshot();
        assert_eq!(view.mode, InputMode::Text);
        assert_eq!(view.phase, Phase::Idle);
        assert!(!view.is_analyzing);
        assert_eq!(view.result, None);
        assert_eq!(view.error, None);
    }

    #[test]
    fn test_empty_input_is_a_validation_error() {
        for input in ["", "   \n"] {
            let mut session = text_session(input);
            let err = session.begin().unwrap_err();
            assert_eq!(err, SessionError::Validation(EMPTY_INPUT_MESSAGE.to_string()));

            let view = session.snapshot();
            assert_eq!(view.phase, Phase::Idle);
            assert!(!view.is_analyzing);
            assert_eq!(view.error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
        }

        let mut url = Session::new();
        url.select_mode(InputMode::Url);
        assert!(matches!(url.begin(), Err(SessionError::Validation(_))));
    }

    #[test]
    fn test_image_mode_requires_loaded_image() {
        let mut session = Session::new();
        session.select_mode(InputMode::Image);
        assert_eq!(
            session.begin().unwrap_err(),
            SessionError::Validation(MISSING_IMAGE_MESSAGE.to_string())
        );

        session.load_image(png_payload()).unwrap();
        let pending = session.begin().unwrap();
        assert!(matches!(pending.request, AnalysisRequest::Image(_)));
    }

    #[test]
    fn test_begin_moves_to_pending_and_clears_previous_outcome() {
        let mut session = text_session("Pay a fee to start");
        let first = session.begin().unwrap();
        session
            .settle(first, Err(AnalysisError::Service("timeout".to_string())))
            .unwrap_err();
        assert_eq!(session.phase(), Phase::Error);

        let pending = session.begin().unwrap();
        assert_eq!(
            pending.request,
            AnalysisRequest::Text("Pay a fee to start".to_string())
        );
        let view = session.snapshot();
        assert_eq!(view.phase, Phase::Pending);
        assert!(view.is_analyzing);
        assert_eq!(view.error, None);
        assert_eq!(view.result, None);
    }

    #[test]
    fn test_second_begin_while_pending_is_rejected() {
        let mut session = text_session("offer");
        let _pending = session.begin().unwrap();
        assert_eq!(session.begin().unwrap_err(), SessionError::InFlight);
        assert!(session.is_in_flight());
    }

    #[test]
    fn test_settle_success_and_error() {
        let mut session = text_session("offer");
        let pending = session.begin().unwrap();
        let result = session.settle(pending, Ok(sample_result())).unwrap();
        assert_eq!(result, sample_result());
        assert_eq!(session.phase(), Phase::Success);
        assert_eq!(session.snapshot().error, None);
        assert!(session.report().unwrap().contains("Final Verdict: Legit"));

        let pending = session.begin().unwrap();
        let err = session
            .settle(pending, Err(AnalysisError::Parse("bad json".to_string())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Analysis(AnalysisError::Parse(_))));
        let view = session.snapshot();
        assert_eq!(view.phase, Phase::Error);
        assert_eq!(view.result, None);
        assert_eq!(view.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
        assert_eq!(session.report(), None);
    }

    #[test]
    fn test_abandon_clears_in_flight() {
        let mut session = text_session("offer");
        let generation = session.begin().unwrap().generation();

        let err = session
            .abandon(generation, AnalysisError::Service("task panicked".to_string()))
            .unwrap_err();
        assert!(matches!(err, SessionError::Analysis(AnalysisError::Service(_))));
        assert!(!session.is_in_flight());
        assert_eq!(session.phase(), Phase::Error);

        // A stale generation only releases the flag
        let generation = session.begin().unwrap().generation();
        session.reset();
        let err = session
            .abandon(generation, AnalysisError::Service("task panicked".to_string()))
            .unwrap_err();
        assert_eq!(err, SessionError::Superseded);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_select_mode_clears_everything() {
        let mut session = text_session("offer");
        let pending = session.begin().unwrap();
        session.settle(pending, Ok(sample_result())).unwrap();

        session.select_mode(InputMode::Image);
        session.load_image(png_payload()).unwrap();
        assert!(session.snapshot().image_preview.is_some());

        for mode in [InputMode::Url, InputMode::Url, InputMode::Text] {
            session.select_mode(mode);
            let view = session.snapshot();
            assert_eq!(view.mode, mode);
            assert_eq!(view.input, "");
            assert_eq!(view.image_preview, None);
            assert_eq!(view.result, None);
            assert_eq!(view.error, None);
            assert_eq!(view.phase, Phase::Idle);
        }
    }

    #[test]
    fn test_outcome_after_mode_switch_is_discarded() {
        let mut session = text_session("offer");
        let pending = session.begin().unwrap();

        session.select_mode(InputMode::Url);
        assert!(session.is_in_flight());
        assert_eq!(session.begin().unwrap_err(), SessionError::InFlight);

        let err = session.settle(pending, Ok(sample_result())).unwrap_err();
        assert_eq!(err, SessionError::Superseded);
        let view = session.snapshot();
        assert_eq!(view.mode, InputMode::Url);
        assert_eq!(view.phase, Phase::Idle);
        assert_eq!(view.result, None);
        assert!(!view.is_analyzing);
    }

    #[test]
    fn test_inputs_are_mode_checked() {
        let mut session = Session::new();
        assert_eq!(
            session.load_image(png_payload()).unwrap_err(),
            SessionError::ModeMismatch(InputMode::Text)
        );

        session.select_mode(InputMode::Image);
        assert_eq!(
            session.set_input("text").unwrap_err(),
            SessionError::ModeMismatch(InputMode::Image)
        );

        session.load_image(png_payload()).unwrap();
        session.clear_image();
        assert_eq!(session.snapshot().image_preview, None);
    }

    #[test]
    fn test_url_input_is_trimmed_in_request() {
        let mut session = Session::new();
        session.select_mode(InputMode::Url);
        session.set_input("  https://careers.example.com/job/1 \n").unwrap();
        let pending = session.begin().unwrap();
        assert_eq!(
            pending.request,
            AnalysisRequest::Url("https://careers.example.com/job/1".to_string())
        );
    }
}
