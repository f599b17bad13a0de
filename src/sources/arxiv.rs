//! arXiv paper source implementation.

use async_trait::async_trait;
use feed_rs::parser;
use std::sync::Arc;

use crate::models::{Paper, PaperBuilder};
use crate::sources::{PaperSource, SearchResponse, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv returns its own errors as a feed whose entry id points here
const ARXIV_ERROR_ID: &str = "arxiv.org/api/errors";

/// arXiv paper source
///
/// Issues a single relevance-ordered query against the arXiv Atom API and
/// keeps at most `limit` entries in the order arXiv returns them.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source
    pub fn new() -> Self {
        Self::with_client(Arc::new(HttpClient::new()))
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    /// Point the source at a different query endpoint (mirrors, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the query URL for a keyword search
    fn build_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            self.base_url,
            urlencoding::encode(&format!("all:{}", query)),
            limit
        )
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<SearchResponse, SourceError> {
        if query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty search query".to_string()));
        }

        let url = self.build_url(query, limit);
        tracing::debug!(%url, "Querying arXiv");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let (papers, skipped) = Self::parse_feed(bytes.as_ref(), limit)?;
        Ok(SearchResponse::new(papers, query).with_skipped(skipped))
    }

    /// Parse an Atom feed into papers, dropping entries that miss a required field.
    ///
    /// Returns the papers (at most `limit`, feed order) and the number of dropped entries.
    pub(crate) fn parse_feed(bytes: &[u8], limit: usize) -> Result<(Vec<Paper>, usize), SourceError> {
        let feed = parser::parse(bytes)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        if let Some(entry) = feed.entries.iter().find(|e| e.id.contains(ARXIV_ERROR_ID)) {
            let message = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_else(|| entry.id.clone());
            return Err(SourceError::Api(message));
        }

        let mut papers = Vec::new();
        let mut skipped = 0;

        for entry in feed.entries.iter().take(limit) {
            match Self::parse_entry(entry) {
                Ok(paper) => papers.push(paper),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(entry = %entry.id, error = %e, "Skipping arXiv entry");
                }
            }
        }

        Ok((papers, skipped))
    }

    /// Parse arXiv Atom feed entry into Paper
    fn parse_entry(entry: &feed_rs::model::Entry) -> Result<Paper, SourceError> {
        // feed-rs invents an id when the element is missing, so only trust URL-shaped ids
        let url = if entry.id.contains("://") {
            entry.id.trim().to_string()
        } else {
            entry
                .links
                .iter()
                .find(|l| l.rel.as_deref().unwrap_or("alternate") == "alternate")
                .map(|l| l.href.clone())
                .ok_or_else(|| SourceError::Parse("Missing entry id".to_string()))?
        };

        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::Parse("Missing title".to_string()))?;

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SourceError::Parse("Missing summary".to_string()))?;

        let published = entry
            .published
            .map(|d| d.date_naive())
            .ok_or_else(|| SourceError::Parse("Missing published date".to_string()))?;

        let authors = entry
            .authors
            .iter()
            .map(|a| a.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        PaperBuilder::new(url, title, published)
            .authors(authors)
            .abstract_text(abstract_text)
            .build()
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// arXiv wraps long titles over several lines
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Default for ArxivSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResponse {
        match self.fetch(query, limit).await {
            Ok(response) => {
                tracing::debug!(
                    found = response.papers.len(),
                    skipped = response.skipped,
                    "arXiv search complete"
                );
                response
            }
            Err(e) => {
                tracing::warn!(error = %e, query, "arXiv search failed");
                SearchResponse::failed(query, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>arXiv Search Results</title>
    <entry>
        <id>http://arxiv.org/abs/2301.12345v1</id>
        <title>Test Paper
            Title</title>
        <summary>  Test abstract  </summary>
        <published>2023-01-15T10:00:00Z</published>
        <author><name>First Author</name></author>
        <author><name>Second Author</name></author>
    </entry>
    <entry>
        <id>http://arxiv.org/abs/2302.00001v2</id>
        <title>No Summary Here</title>
        <published>2023-02-01T10:00:00Z</published>
        <author><name>Someone</name></author>
    </entry>
    <entry>
        <id>http://arxiv.org/abs/2303.54321v1</id>
        <title>Second Good Paper</title>
        <summary>Another abstract</summary>
        <published>2023-03-20T23:59:59Z</published>
    </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <entry>
        <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
        <title>Error</title>
        <summary>incorrect id format for 1234</summary>
        <updated>2023-01-15T00:00:00-05:00</updated>
    </entry>
</feed>"#;

    fn source_for(server: &mockito::ServerGuard) -> ArxivSource {
        ArxivSource::with_client(Arc::new(HttpClient::new()))
            .with_base_url(format!("{}/api/query", server.url()))
    }

    #[test]
    fn test_parse_feed_extracts_fields() {
        let (papers, skipped) = ArxivSource::parse_feed(FEED.as_bytes(), 10).unwrap();

        assert_eq!(skipped, 1);
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.id, "2301.12345v1");
        assert_eq!(first.url, "http://arxiv.org/abs/2301.12345v1");
        assert_eq!(first.title, "Test Paper Title");
        assert_eq!(first.r#abstract, "Test abstract");
        assert_eq!(first.published_iso(), "2023-01-15");
        assert_eq!(first.authors, vec!["First Author", "Second Author"]);

        let second = &papers[1];
        assert_eq!(second.id, "2303.54321v1");
        assert_eq!(second.published_iso(), "2023-03-20");
        assert!(second.authors.is_empty());
    }

    #[test]
    fn test_parse_feed_respects_limit_and_order() {
        let (papers, _) = ArxivSource::parse_feed(FEED.as_bytes(), 1).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id, "2301.12345v1");
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        let result = ArxivSource::parse_feed(b"this is not xml", 5);
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_parse_feed_reports_arxiv_error_entry() {
        let result = ArxivSource::parse_feed(ERROR_FEED.as_bytes(), 5);
        match result {
            Err(SourceError::Api(msg)) => assert!(msg.contains("incorrect id format")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_url() {
        let source = ArxivSource::new();
        let url = source.build_url("deep learning", 5);

        assert!(url.starts_with(ARXIV_API_URL));
        assert!(url.contains("search_query=all%3Adeep%20learning"));
        assert!(url.contains("start=0"));
        assert!(url.contains("max_results=5"));
        assert!(url.contains("sortBy=relevance"));
        assert!(url.contains("sortOrder=descending"));
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/query")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search_query".into(), "all:deep learning".into()),
                Matcher::UrlEncoded("max_results".into(), "5".into()),
                Matcher::UrlEncoded("sortBy".into(), "relevance".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED)
            .create_async()
            .await;

        let response = source_for(&server).search("deep learning", 5).await;

        mock.assert_async().await;
        assert!(response.error.is_none());
        assert_eq!(response.papers.len(), 2);
        assert_eq!(response.skipped, 1);
        assert_eq!(response.query, "deep learning");
    }

    #[tokio::test]
    async fn test_search_http_error_yields_empty_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/query")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let response = source_for(&server).search("graphs", 5).await;

        assert!(response.is_empty());
        let error = response.error.expect("batch error should be reported");
        assert!(error.contains("503"));
    }

    #[tokio::test]
    async fn test_search_unreachable_host_yields_empty_response() {
        let source = ArxivSource::new().with_base_url("http://127.0.0.1:1/api/query");
        let response = source.search("graphs", 5).await;

        assert!(response.is_empty());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query_without_request() {
        let source = ArxivSource::new().with_base_url("http://127.0.0.1:1/api/query");
        let response = source.search("   ", 5).await;

        assert!(response.is_empty());
        assert!(response.error.unwrap().contains("Empty search query"));
    }
}
