//! Mock analysis backend for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{CompletionRequest, LlmBackend, LlmError};
use crate::models::AnalysisTask;

/// A mock backend with scripted answers per analysis task.
///
/// Tasks without a scripted answer get `"mock <task>"`.
#[derive(Debug, Default)]
pub struct MockBackend {
    answers: Mutex<HashMap<AnalysisTask, Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_response(&self, task: AnalysisTask, text: impl Into<String>) {
        self.answers.lock().unwrap().insert(task, Ok(text.into()));
    }

    pub fn set_failure(&self, task: AnalysisTask, error: LlmError) {
        self.answers.lock().unwrap().insert(task, Err(error));
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.answers
            .lock()
            .unwrap()
            .get(&request.task)
            .cloned()
            .unwrap_or_else(|| Ok(format!("mock {}", request.task)))
    }
}
