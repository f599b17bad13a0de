//! Paper model representing a research paper returned by the paper index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A research paper from the paper index
///
/// The `id` is always the last path segment of `url`, so the same URL
/// yields the same identifier every time. Papers are only created through
/// [`PaperBuilder`], which enforces that the identifier is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Source-assigned identifier (e.g. "2301.12345v1"), used as enrichment key
    pub id: String,

    /// Paper title
    pub title: String,

    /// Authors in the order the source lists them
    pub authors: Vec<String>,

    /// Abstract text
    pub r#abstract: String,

    /// Publication date (day precision)
    pub published: NaiveDate,

    /// Canonical paper page URL
    pub url: String,
}

impl Paper {
    /// Derive the paper identifier from its canonical URL.
    ///
    /// Returns the last non-empty path segment, or `None` when the URL has none.
    pub fn id_from_url(url: &str) -> Option<&str> {
        url.trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.ends_with(':'))
    }

    /// Authors joined with ", " for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Publication date as `YYYY-MM-DD`
    pub fn published_iso(&self) -> String {
        self.published.format("%Y-%m-%d").to_string()
    }
}

/// Error returned when a paper cannot satisfy its identifier invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot derive a paper id from url '{url}'")]
pub struct InvalidPaper {
    pub url: String,
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    url: String,
    title: String,
    published: NaiveDate,
    authors: Vec<String>,
    abstract_text: String,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(url: impl Into<String>, title: impl Into<String>, published: NaiveDate) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            published,
            authors: Vec::new(),
            abstract_text: String::new(),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    /// Build the Paper, deriving its id from the URL
    pub fn build(self) -> Result<Paper, InvalidPaper> {
        let id = match Paper::id_from_url(&self.url) {
            Some(id) => id.to_string(),
            None => return Err(InvalidPaper { url: self.url }),
        };

        Ok(Paper {
            id,
            title: self.title,
            authors: self.authors,
            r#abstract: self.abstract_text,
            published: self.published,
            url: self.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
    }

    #[test]
    fn test_paper_builder() {
        let paper = PaperBuilder::new("http://arxiv.org/abs/2301.12345v1", "Test Paper", date())
            .authors(["John Doe", "Jane Smith"])
            .abstract_text("This is a test abstract.")
            .build()
            .unwrap();

        assert_eq!(paper.id, "2301.12345v1");
        assert_eq!(paper.title, "Test Paper");
        assert_eq!(paper.authors, vec!["John Doe", "Jane Smith"]);
        assert_eq!(paper.published_iso(), "2023-01-15");
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(
            Paper::id_from_url("http://arxiv.org/abs/2301.12345v2"),
            Some("2301.12345v2")
        );
        assert_eq!(Paper::id_from_url("http://arxiv.org/abs/2301.12345/"), Some("2301.12345"));
        assert_eq!(Paper::id_from_url("plain-id"), Some("plain-id"));
        assert_eq!(Paper::id_from_url(""), None);
        assert_eq!(Paper::id_from_url("https://"), None);
    }

    #[test]
    fn test_id_is_deterministic() {
        let url = "http://arxiv.org/abs/hep-th/9901001v1";
        let a = PaperBuilder::new(url, "A", date()).build().unwrap();
        let b = PaperBuilder::new(url, "B", date()).build().unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "9901001v1");
    }

    #[test]
    fn test_build_rejects_url_without_id() {
        let err = PaperBuilder::new("", "No id", date()).build().unwrap_err();
        assert_eq!(err.url, "");
    }

    #[test]
    fn test_author_line() {
        let paper = PaperBuilder::new("http://example.com/1", "T", date())
            .authors(["John Doe", "Jane Smith", "Bob Jones"])
            .build()
            .unwrap();

        assert_eq!(paper.author_line(), "John Doe, Jane Smith, Bob Jones");
    }
}
