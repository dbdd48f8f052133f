//! Client for the Generative Language API plus the report-generation
//! pipeline built on top of it: prompt construction, tolerant extraction of
//! structured reports from free-form model output, and the advisory daily
//! usage counter.

mod client;
mod error;
pub mod extract;
mod prompt;
mod report;
mod types;
pub mod usage;

pub use client::{GeminiClient, GenerationConfig};
pub use error::GeminiError;
pub use extract::{extract_reports, ReportPayload};
pub use report::ReportGenerator;
pub use usage::UsageCounter;
