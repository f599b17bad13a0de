use super::{export_document, Aggregator, BuildError, ExportDocument};
use crate::models::ResearchBundle;

/// Holds the bundle of the most recent successful search.
///
/// A failed search leaves the previous bundle in place; a successful one
/// replaces it with a fresh bundle.
#[derive(Debug)]
pub struct ResearchSession {
    aggregator: Aggregator,
    current: Option<ResearchBundle>,
}

impl ResearchSession {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator,
            current: None,
        }
    }

    /// Build a bundle for `query` and make it current on success
    pub async fn search(&mut self, query: &str) -> Result<&ResearchBundle, BuildError> {
        let bundle = self.aggregator.build_bundle(query).await?;
        Ok(&*self.current.insert(bundle))
    }

    pub fn current(&self) -> Option<&ResearchBundle> {
        self.current.as_ref()
    }

    /// Export the current bundle, if any search has succeeded
    pub fn export(&self) -> Option<ExportDocument> {
        self.current.as_ref().map(export_document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisEngine, MockBackend};
    use crate::sources::mock::make_paper;
    use crate::sources::{MockEnrichmentSource, MockPaperSource};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failed_search_keeps_previous_bundle() {
        let papers = Arc::new(MockPaperSource::with_papers(vec![make_paper(
            "2401.00001v1",
            "Kept",
            "Abstract.",
        )]));
        let aggregator = Aggregator::new(
            papers.clone(),
            Arc::new(MockEnrichmentSource::new()),
            AnalysisEngine::new(Arc::new(MockBackend::new())),
        );
        let mut session = ResearchSession::new(aggregator);

        assert!(session.current().is_none());
        assert!(session.export().is_none());

        session.search("first").await.unwrap();
        assert_eq!(session.current().unwrap().query(), "first");

        assert_eq!(session.search("  ").await.unwrap_err(), BuildError::EmptyQuery);
        papers.set_papers(Vec::new());
        assert!(matches!(
            session.search("second").await,
            Err(BuildError::NoPapers { .. })
        ));
        assert_eq!(session.current().unwrap().query(), "first");

        papers.set_papers(vec![make_paper("2402.00002v1", "Fresh", "New.")]);
        let bundle = session.search("third").await.unwrap();
        assert_eq!(bundle.papers()[0].title, "Fresh");
        assert_eq!(
            session.export().unwrap().suggested_filename,
            "research_summary_third.md"
        );
    }
}
