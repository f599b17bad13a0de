//! # Research Digest
//!
//! Searches arXiv for papers on a topic and turns the results into a single
//! research digest: the papers themselves, five generated analyses of their
//! abstracts, and citation data and related works from Semantic Scholar.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, ResearchBundle, etc.)
//! - [`sources`]: Paper and enrichment sources with a trait-based architecture
//! - [`analysis`]: Generative analyses over paper abstracts (Groq backend)
//! - [`aggregator`]: Bundle assembly, markdown export and the search session
//! - [`utils`]: Shared HTTP client
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal rendering for the command-line interface

pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{export_document, Aggregator, BuildError, ExportDocument, ResearchSession};
pub use models::{Paper, ResearchBundle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
