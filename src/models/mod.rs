//! Core data models for papers and aggregated research results.

mod bundle;
mod paper;

pub use bundle::{
    AnalysisResult, AnalysisTask, CitationInfo, Count, RelatedWork, ResearchBundle,
    MAX_RELATED_WORKS, UNKNOWN_TITLE,
};
pub use paper::{InvalidPaper, Paper, PaperBuilder};
