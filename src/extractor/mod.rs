//! Extraction Collaborator boundary - yt-dlp behind a trait
//!
//! Two interchangeable backends (Python module, native binary) plus an
//! orchestrator that auto-selects and falls back between them. Everything
//! past this boundary is yt-dlp's problem: site scraping, anti-bot
//! handling and format negotiation all live there.

mod cli;
mod diagnostics;
mod errors;
mod orchestrator;
mod python;
mod traits;

pub use errors::ExtractError;
pub use orchestrator::Orchestrator;
pub use traits::{ExtractorConfig, MediaExtractor, MediaInfo, RawFormat};
