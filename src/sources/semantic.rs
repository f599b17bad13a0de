//! Semantic Scholar enrichment source implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{CitationInfo, RelatedWork, MAX_RELATED_WORKS};
use crate::sources::{Enrichment, EnrichmentSource, SourceError};
use crate::utils::{HttpClient, DEFAULT_USER_AGENT};

/// Base URL for the Semantic Scholar Graph API
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested for a paper lookup
const LOOKUP_FIELDS: &str = "title,citationCount,referenceCount,references.title,references.paperId";

/// Lookup timeout used when no client is supplied
pub const ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Semantic Scholar enrichment source
///
/// Looks a paper up by its arXiv identifier and derives both the citation
/// counts and the related works from that single response.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source
    pub fn new() -> Self {
        Self::with_client(Arc::new(HttpClient::with_options(
            DEFAULT_USER_AGENT,
            ENRICHMENT_TIMEOUT,
        )))
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: SEMANTIC_API_BASE.to_string(),
            api_key: None,
        }
    }

    /// Use an API key (optional, for higher rate limits)
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Point the source at a different API base (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Strip a trailing arXiv version suffix ("2301.12345v2" -> "2301.12345")
    fn lookup_key(paper_id: &str) -> &str {
        let id = paper_id.trim();
        match id.rfind('v') {
            Some(pos)
                if pos > 0
                    && pos + 1 < id.len()
                    && id[pos + 1..].chars().all(|c| c.is_ascii_digit()) =>
            {
                &id[..pos]
            }
            _ => id,
        }
    }

    /// Build request URL for a paper lookup
    fn build_url(&self, paper_id: &str) -> String {
        format!(
            "{}/paper/arXiv:{}?fields={}",
            self.base_url,
            urlencoding::encode(Self::lookup_key(paper_id)),
            LOOKUP_FIELDS
        )
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    async fn fetch(&self, paper_id: &str) -> Result<S2Paper, SourceError> {
        if paper_id.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty paper id".to_string()));
        }

        let url = self.build_url(paper_id);
        tracing::debug!(%url, "Looking up paper on Semantic Scholar");

        let response = self
            .add_api_key_if_present(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch paper: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(paper_id.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar API returned status: {}",
                status
            )));
        }

        response
            .json::<S2Paper>()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))
    }

    /// Turn a lookup response into citation info and at most five related works
    fn to_enrichment(data: S2Paper) -> Enrichment {
        let related_works = data
            .references
            .unwrap_or_default()
            .into_iter()
            .take(MAX_RELATED_WORKS)
            .map(|r| RelatedWork::new(r.title, r.paper_id))
            .collect();

        Enrichment {
            citation_info: CitationInfo::reported(data.citation_count, data.reference_count),
            related_works,
        }
    }
}

impl Default for SemanticScholarSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrichmentSource for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn enrich(&self, paper_id: &str) -> Enrichment {
        match self.fetch(paper_id).await {
            Ok(data) => Self::to_enrichment(data),
            Err(e) => {
                tracing::warn!(paper_id, error = %e, "Semantic Scholar unavailable");
                Enrichment::unavailable()
            }
        }
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "citationCount")]
    citation_count: Option<u64>,
    #[serde(rename = "referenceCount")]
    reference_count: Option<u64>,
    #[serde(default)]
    references: Option<Vec<S2Reference>>,
}

#[derive(Debug, Deserialize)]
struct S2Reference {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
}
