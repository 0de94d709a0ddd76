// src/types/mod.rs
pub mod analysis;
pub mod gemini;

pub use analysis::{AnalysisResult, GroundingSource, InputMode, Verdict};
