pub mod analysis;
pub mod cli;
pub mod controller;
pub mod core;
pub mod image_ingest;
pub mod report;
pub mod session;
pub mod types;
pub mod utils;
pub mod web;

#[cfg(test)]
mod test_support;

pub use analysis::{AnalysisError, AnalysisRequest, GeminiClient, OfferAnalyzer};
pub use controller::Controller;
pub use image_ingest::{ImageError, ImagePayload};
pub use report::render_report;
pub use session::{Phase, SessionError, SessionView};
pub use types::{AnalysisResult, GroundingSource, InputMode, Verdict};
pub use web::start_web_server;
