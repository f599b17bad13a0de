//! Aggregated research results: citation data, related works, analyses and the bundle root.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::Paper;

/// Title used when the enrichment source omits a related work's title
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Maximum number of related works kept in a bundle
pub const MAX_RELATED_WORKS: usize = 5;

/// A count reported by the enrichment source, or `Unknown` when it was not reported
///
/// Serializes as a number, or as the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Count {
    Known(u64),
    #[default]
    Unknown,
}

impl Count {
    /// The count, if known
    pub fn known(self) -> Option<u64> {
        match self {
            Count::Known(n) => Some(n),
            Count::Unknown => None,
        }
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Count::Known(value)
    }
}

impl From<Option<u64>> for Count {
    fn from(value: Option<u64>) -> Self {
        value.map(Count::Known).unwrap_or(Count::Unknown)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Known(n) => write!(f, "{}", n),
            Count::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Count::Known(n) => serializer.serialize_u64(*n),
            Count::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Count::Known(n)),
            Raw::Text(s) if s == "unknown" => Ok(Count::Unknown),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a count or \"unknown\", got \"{}\"",
                s
            ))),
        }
    }
}

/// Citation metadata for the representative paper of a bundle
///
/// `available == false` means the enrichment source could not be reached or did
/// not know the paper. That state is distinct from a paper with zero citations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationInfo {
    pub citation_count: Count,
    pub reference_count: Count,
    pub available: bool,
}

impl CitationInfo {
    /// Citation data reported by the enrichment source
    pub fn reported(citation_count: impl Into<Count>, reference_count: impl Into<Count>) -> Self {
        Self {
            citation_count: citation_count.into(),
            reference_count: reference_count.into(),
            available: true,
        }
    }

    /// Enrichment source unavailable; counts are not meaningful
    pub fn unavailable() -> Self {
        Self {
            citation_count: Count::Unknown,
            reference_count: Count::Unknown,
            available: false,
        }
    }

    /// Citation count, only when the data is available and the count was reported
    pub fn citations(&self) -> Option<u64> {
        if self.available {
            self.citation_count.known()
        } else {
            None
        }
    }

    /// Reference count, only when the data is available and the count was reported
    pub fn references(&self) -> Option<u64> {
        if self.available {
            self.reference_count.known()
        } else {
            None
        }
    }
}

/// A work related to the representative paper (one of its references)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedWork {
    #[serde(default = "unknown_title")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
}

fn unknown_title() -> String {
    UNKNOWN_TITLE.to_string()
}

impl RelatedWork {
    /// Create a related work, falling back to [`UNKNOWN_TITLE`] for a missing or blank title
    pub fn new(title: Option<String>, paper_id: Option<String>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(unknown_title);
        Self { title, paper_id }
    }
}

/// The five analyses produced for a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTask {
    Summary,
    SimplifiedExplanation,
    Keywords,
    Trends,
    OpenChallenges,
}

impl AnalysisTask {
    /// All tasks in bundle field order
    pub const ALL: [AnalysisTask; 5] = [
        AnalysisTask::Summary,
        AnalysisTask::SimplifiedExplanation,
        AnalysisTask::Keywords,
        AnalysisTask::Trends,
        AnalysisTask::OpenChallenges,
    ];

    /// Human-readable name of the analysis
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisTask::Summary => "summary",
            AnalysisTask::SimplifiedExplanation => "simplified explanation",
            AnalysisTask::Keywords => "keywords",
            AnalysisTask::Trends => "trends",
            AnalysisTask::OpenChallenges => "open challenges",
        }
    }
}

impl fmt::Display for AnalysisTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generated analyses over the abstracts of a bundle's papers
///
/// Every field is produced independently. A field whose generation failed holds
/// an explanatory error message (keywords: an empty list) and its task is listed
/// in `degraded`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub simplified_explanation: String,
    pub keywords: Vec<String>,
    pub trends: String,
    pub open_challenges: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<AnalysisTask>,
}

impl AnalysisResult {
    /// Whether the given field holds generated content
    pub fn is_ok(&self, task: AnalysisTask) -> bool {
        !self.degraded.contains(&task)
    }

    /// Whether every field holds generated content
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// The aggregate result of one research query
///
/// Built once per search and never modified afterwards; a new search produces
/// a new bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchBundle {
    query: String,
    papers: Vec<Paper>,
    analysis: AnalysisResult,
    related_works: Vec<RelatedWork>,
    citation_info: CitationInfo,
}

impl ResearchBundle {
    pub(crate) fn new(
        query: String,
        papers: Vec<Paper>,
        analysis: AnalysisResult,
        mut related_works: Vec<RelatedWork>,
        citation_info: CitationInfo,
    ) -> Self {
        debug_assert!(!papers.is_empty(), "a bundle needs at least one paper");
        related_works.truncate(MAX_RELATED_WORKS);
        Self {
            query,
            papers,
            analysis,
            related_works,
            citation_info,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    pub fn related_works(&self) -> &[RelatedWork] {
        &self.related_works
    }

    pub fn citation_info(&self) -> &CitationInfo {
        &self.citation_info
    }
}
