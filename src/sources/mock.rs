//! Mock sources for testing purposes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Paper, PaperBuilder};
use crate::sources::{Enrichment, EnrichmentSource, PaperSource, SearchResponse, SourceError};

/// A mock paper source that returns predefined papers and counts its calls.
#[derive(Debug, Default)]
pub struct MockPaperSource {
    papers: Mutex<Vec<Paper>>,
    error: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockPaperSource {
    /// Create a new mock source that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source returning the given papers.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        let source = Self::new();
        source.set_papers(papers);
        source
    }

    /// Set the papers to return.
    pub fn set_papers(&self, papers: Vec<Paper>) {
        *self.papers.lock().unwrap() = papers;
    }

    /// Make every search fail at the batch level with the given message.
    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock().unwrap() = Some(message.into());
    }

    /// Number of searches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaperSource for MockPaperSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Paper Source"
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.error.lock().unwrap().clone() {
            return SearchResponse::failed(query, &SourceError::Network(message));
        }

        let papers = self.papers.lock().unwrap().iter().take(limit).cloned().collect();
        SearchResponse::new(papers, query)
    }
}

/// A mock enrichment source returning a fixed enrichment and recording lookups.
#[derive(Debug)]
pub struct MockEnrichmentSource {
    enrichment: Mutex<Enrichment>,
    lookups: Mutex<Vec<String>>,
}

impl MockEnrichmentSource {
    /// Create a mock source that is unavailable.
    pub fn new() -> Self {
        Self::with_enrichment(Enrichment::unavailable())
    }

    /// Create a mock source returning the given enrichment.
    pub fn with_enrichment(enrichment: Enrichment) -> Self {
        Self {
            enrichment: Mutex::new(enrichment),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Set the enrichment to return.
    pub fn set_enrichment(&self, enrichment: Enrichment) {
        *self.enrichment.lock().unwrap() = enrichment;
    }

    /// Paper ids looked up so far, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

impl Default for MockEnrichmentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrichmentSource for MockEnrichmentSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Enrichment Source"
    }

    async fn enrich(&self, paper_id: &str) -> Enrichment {
        self.lookups.lock().unwrap().push(paper_id.to_string());
        self.enrichment.lock().unwrap().clone()
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(paper_id: &str, title: &str, abstract_text: &str) -> Paper {
    PaperBuilder::new(
        format!("http://arxiv.org/abs/{}", paper_id),
        title,
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
    )
    .authors(["Ada Lovelace", "Alan Turing"])
    .abstract_text(abstract_text)
    .build()
    .unwrap_or_else(|e| panic!("mock paper id must be valid: {}", e))
}
