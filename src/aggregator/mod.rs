//! Research bundle assembly.
//!
//! The [`Aggregator`] drives one query through the pipeline: a paper search,
//! then citation enrichment of the most relevant paper alongside the five
//! analyses of all abstracts. Only two conditions stop a build: an empty query
//! and a search that finds no papers. Every other failure degrades the field
//! it affects and the bundle is still produced.

mod export;
mod session;

pub use export::{export_document, suggested_filename, ExportDocument, MAX_SLUG_LEN};
pub use session::ResearchSession;

use std::sync::Arc;

use crate::analysis::{AnalysisEngine, GroqClient};
use crate::config::Config;
use crate::models::ResearchBundle;
use crate::sources::{ArxivSource, EnrichmentSource, PaperSource, SemanticScholarSource};
use crate::utils::HttpClient;

/// Papers requested per search when no limit is configured
pub const DEFAULT_MAX_PAPERS: usize = 5;

/// Conditions under which no bundle can be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The query was empty after trimming; nothing was requested
    #[error("Please enter a search query")]
    EmptyQuery,

    /// The search returned no papers; enrichment and analysis were skipped
    #[error(
        "No papers found for '{query}'{}",
        .reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default()
    )]
    NoPapers {
        query: String,
        /// Batch-level search failure, when the search itself failed
        reason: Option<String>,
    },
}

/// Builds research bundles from a paper source, an enrichment source and an analysis engine
#[derive(Debug, Clone)]
pub struct Aggregator {
    papers: Arc<dyn PaperSource>,
    enrichment: Arc<dyn EnrichmentSource>,
    analysis: AnalysisEngine,
    limit: usize,
}

impl Aggregator {
    pub fn new(
        papers: Arc<dyn PaperSource>,
        enrichment: Arc<dyn EnrichmentSource>,
        analysis: AnalysisEngine,
    ) -> Self {
        Self {
            papers,
            enrichment,
            analysis,
            limit: DEFAULT_MAX_PAPERS,
        }
    }

    /// Wire arXiv, Semantic Scholar and Groq from configuration.
    ///
    /// Without a Groq key the analysis engine is left unconfigured and every
    /// analysis field degrades.
    pub fn from_config(config: &Config) -> Self {
        let user_agent = config.http.user_agent.as_str();

        let search_client = Arc::new(HttpClient::with_options(user_agent, config.http_timeout()));
        let papers = ArxivSource::with_client(search_client)
            .with_base_url(config.sources.arxiv_url.clone());

        let enrichment_client = Arc::new(HttpClient::with_options(
            user_agent,
            config.enrichment_timeout(),
        ));
        let enrichment = SemanticScholarSource::with_client(enrichment_client)
            .with_base_url(config.sources.semantic_scholar_url.clone())
            .with_api_key(config.api_keys.semantic_scholar.clone());

        let analysis = match &config.api_keys.groq {
            Some(key) => {
                let llm_client = Arc::new(HttpClient::with_options(user_agent, config.llm_timeout()));
                let backend = GroqClient::with_client(llm_client, key.clone())
                    .with_base_url(config.llm.base_url.clone())
                    .with_model(config.llm.model.clone());
                AnalysisEngine::new(Arc::new(backend)).with_timeout(config.llm_timeout())
            }
            None => {
                tracing::warn!("No Groq API key configured (GROQ_API_KEY); analyses will be unavailable");
                AnalysisEngine::unconfigured()
            }
        };

        Self::new(Arc::new(papers), Arc::new(enrichment), analysis)
            .with_limit(config.sources.max_papers)
    }

    /// Request at most `limit` papers per search (at least one)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn analysis(&self) -> &AnalysisEngine {
        &self.analysis
    }

    /// Build a fresh bundle for `query`.
    ///
    /// The first paper in relevance order is the representative paper whose
    /// citation data and references populate the bundle.
    pub async fn build_bundle(&self, query: &str) -> Result<ResearchBundle, BuildError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BuildError::EmptyQuery);
        }

        tracing::info!(query, limit = self.limit, source = self.papers.name(), "Searching papers");
        let response = self.papers.search(query, self.limit).await;

        let mut papers = response.papers;
        if papers.is_empty() {
            tracing::warn!(query, error = ?response.error, "No papers found");
            return Err(BuildError::NoPapers {
                query: query.to_string(),
                reason: response.error,
            });
        }
        papers.truncate(self.limit);

        let (enrichment, analysis) = tokio::join!(
            self.enrichment.enrich(&papers[0].id),
            self.analysis.analyze(&papers),
        );

        tracing::info!(
            query,
            papers = papers.len(),
            skipped = response.skipped,
            citations_available = enrichment.citation_info.available,
            related_works = enrichment.related_works.len(),
            degraded = analysis.degraded.len(),
            "Research bundle assembled"
        );

        Ok(ResearchBundle::new(
            query.to_string(),
            papers,
            analysis,
            enrichment.related_works,
            enrichment.citation_info,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LlmError, MockBackend};
    use crate::models::{AnalysisTask, CitationInfo, Count, RelatedWork};
    use crate::sources::mock::make_paper;
    use crate::sources::{Enrichment, MockEnrichmentSource, MockPaperSource};

    struct Harness {
        papers: Arc<MockPaperSource>,
        enrichment: Arc<MockEnrichmentSource>,
        backend: Arc<MockBackend>,
    }

    impl Harness {
        fn new(paper_count: usize) -> Self {
            let papers = (1..=paper_count)
                .map(|i| {
                    make_paper(
                        &format!("2401.0000{}v1", i),
                        &format!("Paper {}", i),
                        &format!("Abstract {}.", i),
                    )
                })
                .collect();
            Self {
                papers: Arc::new(MockPaperSource::with_papers(papers)),
                enrichment: Arc::new(MockEnrichmentSource::new()),
                backend: Arc::new(MockBackend::new()),
            }
        }

        fn aggregator(&self) -> Aggregator {
            Aggregator::new(
                self.papers.clone(),
                self.enrichment.clone(),
                AnalysisEngine::new(self.backend.clone()),
            )
        }
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_calls() {
        let h = Harness::new(3);

        for query in ["", "   ", "\t\n"] {
            let err = h.aggregator().build_bundle(query).await.unwrap_err();
            assert_eq!(err, BuildError::EmptyQuery);
        }

        assert_eq!(h.papers.calls(), 0);
        assert_eq!(h.enrichment.calls(), 0);
        assert_eq!(h.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_papers_skips_enrichment_and_analysis() {
        let h = Harness::new(0);

        let err = h.aggregator().build_bundle("nothing matches").await.unwrap_err();

        assert_eq!(
            err,
            BuildError::NoPapers {
                query: "nothing matches".to_string(),
                reason: None
            }
        );
        assert_eq!(h.papers.calls(), 1);
        assert_eq!(h.enrichment.calls(), 0);
        assert_eq!(h.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_search_reports_reason() {
        let h = Harness::new(2);
        h.papers.set_error("connection refused");

        let err = h.aggregator().build_bundle("graphs").await.unwrap_err();

        match &err {
            BuildError::NoPapers { reason: Some(reason), .. } => {
                assert!(reason.contains("connection refused"))
            }
            other => panic!("expected NoPapers with reason, got {:?}", other),
        }
        assert!(err.to_string().starts_with("No papers found for 'graphs' ("));
        assert_eq!(h.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_bundle_combines_all_parts() {
        let h = Harness::new(3);
        h.enrichment.set_enrichment(Enrichment {
            citation_info: CitationInfo::reported(42u64, 17u64),
            related_works: (1..=7)
                .map(|i| RelatedWork::new(Some(format!("Ref {}", i)), None))
                .collect(),
        });
        h.backend.set_response(AnalysisTask::Keywords, "ml, graphs");

        let bundle = h.aggregator().build_bundle("  graph learning ").await.unwrap();

        assert_eq!(bundle.query(), "graph learning");
        assert_eq!(bundle.papers().len(), 3);
        assert_eq!(bundle.papers()[0].id, "2401.00001v1");
        assert_eq!(h.enrichment.lookups(), vec!["2401.00001v1"]);
        assert_eq!(bundle.citation_info().citation_count, Count::Known(42));
        assert_eq!(bundle.related_works().len(), 5);
        assert_eq!(bundle.related_works()[4].title, "Ref 5");
        assert_eq!(bundle.analysis().keywords, vec!["ml", "graphs"]);
        assert!(bundle.analysis().is_complete());
        assert_eq!(h.backend.calls(), 5);
    }

    #[tokio::test]
    async fn test_limit_is_applied() {
        let h = Harness::new(4);
        let bundle = h.aggregator().with_limit(2).build_bundle("q").await.unwrap();
        assert_eq!(bundle.papers().len(), 2);

        assert_eq!(h.aggregator().with_limit(0).limit(), 1);
        assert_eq!(h.aggregator().limit(), DEFAULT_MAX_PAPERS);
    }

    #[tokio::test]
    async fn test_enrichment_unavailable_still_builds() {
        let h = Harness::new(1);

        let bundle = h.aggregator().build_bundle("q").await.unwrap();

        assert!(!bundle.citation_info().available);
        assert!(bundle.related_works().is_empty());
        assert!(bundle.analysis().is_complete());
    }

    #[tokio::test]
    async fn test_summary_failure_only_degrades_summary() {
        let h = Harness::new(2);
        h.backend.set_failure(
            AnalysisTask::Summary,
            LlmError::Request("connection reset".to_string()),
        );

        let bundle = h.aggregator().build_bundle("q").await.unwrap();
        let analysis = bundle.analysis();

        assert!(analysis.summary.starts_with("Error generating summary"));
        assert_eq!(analysis.degraded, vec![AnalysisTask::Summary]);
        assert_eq!(analysis.trends, "mock trends");
        assert_eq!(analysis.keywords, vec!["mock keywords"]);
    }

    #[test]
    fn test_from_config_without_groq_key_is_unconfigured() {
        let config = Config::default();
        let aggregator = Aggregator::from_config(&config);
        assert!(!aggregator.analysis().is_configured());
        assert_eq!(aggregator.limit(), 5);

        let mut config = Config::default();
        config.api_keys.groq = Some("key".to_string());
        config.sources.max_papers = 3;
        let aggregator = Aggregator::from_config(&config);
        assert!(aggregator.analysis().is_configured());
        assert_eq!(aggregator.limit(), 3);
    }
}
