//! External data sources with a trait-based architecture.
//!
//! Two kinds of source feed a research bundle:
//!
//! - [`PaperSource`]: searches a paper index by keyword ([`ArxivSource`])
//! - [`EnrichmentSource`]: looks up citation counts and related works for one
//!   paper ([`SemanticScholarSource`])
//!
//! Neither trait surfaces errors to its caller. A paper search that fails at
//! the batch level yields an empty [`SearchResponse`] carrying the error, and a
//! failed enrichment lookup yields [`Enrichment::unavailable`]. Both outcomes are
//! ordinary values the aggregator can merge without inspecting an error channel.
//!
//! New sources can be added by implementing the trait and handing an
//! `Arc<dyn PaperSource>` or `Arc<dyn EnrichmentSource>` to the
//! [`Aggregator`](crate::aggregator::Aggregator).

mod arxiv;
pub mod mock;
mod semantic;

pub use arxiv::{ArxivSource, ARXIV_API_URL};
pub use mock::{MockEnrichmentSource, MockPaperSource};
pub use semantic::{SemanticScholarSource, ENRICHMENT_TIMEOUT, SEMANTIC_API_BASE};

use crate::models::{CitationInfo, Paper, RelatedWork};
use async_trait::async_trait;
use serde::Serialize;

/// Result of one paper search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    /// Papers in the source's relevance order
    pub papers: Vec<Paper>,

    /// The query that was searched
    pub query: String,

    /// Entries dropped because a required field was missing
    pub skipped: usize,

    /// Batch-level failure, if the search could not be completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Create a successful response
    pub fn new(papers: Vec<Paper>, query: impl Into<String>) -> Self {
        Self {
            papers,
            query: query.into(),
            skipped: 0,
            error: None,
        }
    }

    /// Create an empty response for a failed search
    pub fn failed(query: impl Into<String>, error: &SourceError) -> Self {
        Self {
            papers: Vec::new(),
            query: query.into(),
            skipped: 0,
            error: Some(error.to_string()),
        }
    }

    /// Record the number of entries that could not be parsed
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Citation data and related works for one paper, fetched together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub citation_info: CitationInfo,
    pub related_works: Vec<RelatedWork>,
}

impl Enrichment {
    /// Degraded outcome: the enrichment source could not provide data
    pub fn unavailable() -> Self {
        Self {
            citation_info: CitationInfo::unavailable(),
            related_works: Vec::new(),
        }
    }
}

/// A searchable index of academic papers
#[async_trait]
pub trait PaperSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for at most `limit` papers matching `query`, in the index's relevance order.
    ///
    /// The query must be non-empty. Failures are reported in
    /// [`SearchResponse::error`] with an empty paper list.
    async fn search(&self, query: &str, limit: usize) -> SearchResponse;
}

/// A secondary index providing citation metadata for a paper
#[async_trait]
pub trait EnrichmentSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "semantic")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch citation counts and related works for a paper in a single lookup.
    ///
    /// Never fails: any lookup problem yields [`Enrichment::unavailable`].
    async fn enrich(&self, paper_id: &str) -> Enrichment;

    /// Citation counts only. Prefer [`enrich`](Self::enrich) when related works
    /// are needed too, to avoid a second lookup.
    async fn citation_info(&self, paper_id: &str) -> CitationInfo {
        self.enrich(paper_id).await.citation_info
    }

    /// Related works only (at most five, source order).
    async fn related_works(&self, paper_id: &str) -> Vec<RelatedWork> {
        self.enrich(paper_id).await.related_works
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Paper not found
    #[error("Paper not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
