//! Generative analysis of paper abstracts.
//!
//! The [`AnalysisEngine`] turns the abstracts of a search result into the five
//! fields of an [`AnalysisResult`]: a summary, a simplified explanation, a
//! keyword list, a trend analysis and an open-challenges analysis. Each field
//! is one chat completion against an [`LlmBackend`] with its own prompt and
//! sampling temperature.
//!
//! The five calls are independent. They run concurrently, each under its own
//! timeout, and a failure degrades only the field it was producing.
//!
//! ```rust,no_run
//! use research_digest::analysis::{AnalysisEngine, GroqClient};
//! use std::sync::Arc;
//!
//! # async fn example(abstracts: Vec<String>) {
//! // Construct the backend once and share it; the engine is cheap to clone.
//! let engine = match GroqClient::from_env() {
//!     Some(client) => AnalysisEngine::new(Arc::new(client)),
//!     None => AnalysisEngine::unconfigured(),
//! };
//!
//! let abstracts: Vec<&str> = abstracts.iter().map(String::as_str).collect();
//! let summary = engine.summarize(&abstracts).await;
//! # }
//! ```

mod groq;
mod keywords;
pub mod mock;
mod prompts;

pub use groq::{GroqClient, DEFAULT_MODEL, GROQ_API_BASE};
pub use keywords::parse_keywords;
pub use mock::MockBackend;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{AnalysisResult, AnalysisTask, Paper};

/// Separator placed between abstracts in every prompt
pub const ABSTRACT_SEPARATOR: &str = "\n\n";

/// Default bound on a single analysis call
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

/// One chat completion to perform
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The analysis this completion produces
    pub task: AnalysisTask,

    /// Content of the single user message
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,
}

/// A generative language backend answering single-message chat completions
#[async_trait]
pub trait LlmBackend: Send + Sync + std::fmt::Debug {
    /// Human-readable name of the backend
    fn name(&self) -> &str;

    /// Return the text of the first completion choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Errors from the generative backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    /// No credential was configured, so no backend exists
    #[error("analysis backend not configured (set GROQ_API_KEY)")]
    NotConfigured,

    /// Network or transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status from the backend
    #[error("backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("invalid response: {0}")]
    Parse(String),

    /// The response contained no completion text
    #[error("empty response from backend")]
    EmptyResponse,

    /// The call did not finish within its time bound
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces the five analyses of a research bundle
///
/// Built once from an explicitly constructed backend and reused for every
/// query. Without a backend ([`AnalysisEngine::unconfigured`]) every operation
/// fails with [`LlmError::NotConfigured`] and no network call is made.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    backend: Option<Arc<dyn LlmBackend>>,
    timeout: Duration,
}

impl AnalysisEngine {
    /// Create an engine over the given backend
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    /// Create an engine with no backend; every analysis degrades
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    /// Bound each analysis call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a backend is available
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Comprehensive synthesis of findings, methods and insights
    pub async fn summarize(&self, abstracts: &[&str]) -> Result<String, LlmError> {
        self.run(AnalysisTask::Summary, abstracts).await
    }

    /// Jargon-free, analogy-driven explanation for a lay reader
    pub async fn simplify(&self, abstracts: &[&str]) -> Result<String, LlmError> {
        self.run(AnalysisTask::SimplifiedExplanation, abstracts).await
    }

    /// Key terms, parsed from the backend's comma-separated answer
    pub async fn extract_keywords(&self, abstracts: &[&str]) -> Result<Vec<String>, LlmError> {
        let text = self.run(AnalysisTask::Keywords, abstracts).await?;
        Ok(parse_keywords(&text))
    }

    /// Current trends, emerging patterns, common methods and themes
    pub async fn analyze_trends(&self, abstracts: &[&str]) -> Result<String, LlmError> {
        self.run(AnalysisTask::Trends, abstracts).await
    }

    /// Open problems, limitations and future directions
    pub async fn identify_challenges(&self, abstracts: &[&str]) -> Result<String, LlmError> {
        self.run(AnalysisTask::OpenChallenges, abstracts).await
    }

    /// Run all five analyses concurrently over the papers' abstracts.
    ///
    /// Never fails as a whole: a failed analysis is replaced by an error
    /// message (keywords by an empty list) and recorded in
    /// [`AnalysisResult::degraded`].
    pub async fn analyze(&self, papers: &[Paper]) -> AnalysisResult {
        let abstracts: Vec<&str> = papers.iter().map(|p| p.r#abstract.as_str()).collect();

        let (summary, simplified, keywords, trends, challenges) = tokio::join!(
            self.summarize(&abstracts),
            self.simplify(&abstracts),
            self.extract_keywords(&abstracts),
            self.analyze_trends(&abstracts),
            self.identify_challenges(&abstracts),
        );

        let mut degraded = Vec::new();
        let mut text_or_error = |task: AnalysisTask, outcome: Result<String, LlmError>| match outcome {
            Ok(text) => text,
            Err(e) => {
                degraded.push(task);
                task.error_message(&e)
            }
        };

        let summary = text_or_error(AnalysisTask::Summary, summary);
        let simplified_explanation =
            text_or_error(AnalysisTask::SimplifiedExplanation, simplified);
        let trends = text_or_error(AnalysisTask::Trends, trends);
        let open_challenges = text_or_error(AnalysisTask::OpenChallenges, challenges);

        let keywords = keywords.unwrap_or_else(|_| {
            degraded.push(AnalysisTask::Keywords);
            Vec::new()
        });
        degraded.sort();

        if !degraded.is_empty() {
            tracing::warn!(?degraded, "Some analyses could not be generated");
        }

        AnalysisResult {
            summary,
            simplified_explanation,
            keywords,
            trends,
            open_challenges,
            degraded,
        }
    }

    async fn run(&self, task: AnalysisTask, abstracts: &[&str]) -> Result<String, LlmError> {
        let backend = self.backend.as_ref().ok_or(LlmError::NotConfigured)?;

        let request = CompletionRequest {
            task,
            prompt: task.prompt(&abstracts.join(ABSTRACT_SEPARATOR)),
            temperature: task.temperature(),
        };

        let result = tokio::time::timeout(self.timeout, backend.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))
            .and_then(|r| r);

        match &result {
            Ok(_) => tracing::debug!(%task, backend = backend.name(), "Analysis complete"),
            Err(e) => tracing::warn!(%task, error = %e, "Analysis failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_paper;

    fn papers() -> Vec<Paper> {
        vec![
            make_paper("2401.00001v1", "First", "Abstract one."),
            make_paper("2401.00002v1", "Second", "Abstract two."),
        ]
    }

    #[tokio::test]
    async fn test_analyze_fills_every_field() {
        let backend = Arc::new(MockBackend::new());
        backend.set_response(AnalysisTask::Summary, "A summary");
        backend.set_response(AnalysisTask::SimplifiedExplanation, "Like you're 15");
        backend.set_response(AnalysisTask::Keywords, "  ml,  AI ,, robotics");
        backend.set_response(AnalysisTask::Trends, "Trending");
        backend.set_response(AnalysisTask::OpenChallenges, "Hard problems");

        let result = AnalysisEngine::new(backend.clone()).analyze(&papers()).await;

        assert!(result.is_complete());
        assert_eq!(result.summary, "A summary");
        assert_eq!(result.simplified_explanation, "Like you're 15");
        assert_eq!(result.keywords, vec!["ml", "AI", "robotics"]);
        assert_eq!(result.trends, "Trending");
        assert_eq!(result.open_challenges, "Hard problems");
        assert_eq!(backend.calls(), 5);
    }

    #[tokio::test]
    async fn test_prompts_carry_abstracts_in_paper_order() {
        let backend = Arc::new(MockBackend::new());
        AnalysisEngine::new(backend.clone()).analyze(&papers()).await;

        for request in backend.requests() {
            assert!(
                request.prompt.contains("Abstract one.\n\nAbstract two."),
                "prompt for {} should contain joined abstracts",
                request.task
            );
            assert_eq!(request.temperature, request.task.temperature());
        }
    }

    #[tokio::test]
    async fn test_summary_failure_is_isolated() {
        let backend = Arc::new(MockBackend::new());
        backend.set_failure(AnalysisTask::Summary, LlmError::Timeout(Duration::from_secs(1)));
        backend.set_response(AnalysisTask::Keywords, "graphs, networks");

        let result = AnalysisEngine::new(backend).analyze(&papers()).await;

        assert_eq!(result.degraded, vec![AnalysisTask::Summary]);
        assert!(result.summary.starts_with("Error generating summary"));
        assert!(result.is_ok(AnalysisTask::Trends));
        assert!(!result.trends.starts_with("Error"));
        assert!(!result.simplified_explanation.starts_with("Error"));
        assert!(!result.open_challenges.starts_with("Error"));
        assert_eq!(result.keywords, vec!["graphs", "networks"]);
    }

    #[tokio::test]
    async fn test_keyword_failure_degrades_to_empty_list() {
        let backend = Arc::new(MockBackend::new());
        backend.set_failure(
            AnalysisTask::Keywords,
            LlmError::Api {
                status: 500,
                message: "boom".into(),
            },
        );

        let result = AnalysisEngine::new(backend).analyze(&papers()).await;

        assert!(result.keywords.is_empty());
        assert_eq!(result.degraded, vec![AnalysisTask::Keywords]);
    }

    #[tokio::test]
    async fn test_unconfigured_engine_degrades_everything() {
        let engine = AnalysisEngine::unconfigured();
        assert!(!engine.is_configured());

        let result = engine.analyze(&papers()).await;

        assert_eq!(result.degraded, AnalysisTask::ALL.to_vec());
        assert!(result.keywords.is_empty());
        assert!(result.summary.contains("not configured"));
        assert!(result.open_challenges.contains("not configured"));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(200)));
        let engine = AnalysisEngine::new(backend).with_timeout(Duration::from_millis(20));

        let err = engine.summarize(&["text"]).await.unwrap_err();
        assert_eq!(err, LlmError::Timeout(Duration::from_millis(20)));
    }
}
