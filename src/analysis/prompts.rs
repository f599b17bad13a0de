//! Prompt templates and sampling parameters for each analysis.

use super::LlmError;
use crate::models::AnalysisTask;

const SUMMARY_TEMPLATE: &str = "\
Please provide a comprehensive summary of the following research papers.
Focus on the main findings, methodologies, and key insights:

{abstracts}

Provide a clear, structured summary highlighting the most important points.";

const SIMPLIFIED_TEMPLATE: &str = "\
Explain the following research in simple terms that a 15-year-old would understand.
Use analogies and avoid technical jargon:

{abstracts}

Make it engaging and easy to understand.";

const KEYWORDS_TEMPLATE: &str = "\
Extract the most important keywords and key terms from this research:

{abstracts}

Return only a list of 10-15 key terms, separated by commas.";

const TRENDS_TEMPLATE: &str = "\
Analyze the following research papers and identify:
1. Current trends in this field
2. Emerging patterns
3. Common methodologies
4. Key themes

Research abstracts:
{abstracts}

Provide insights about the direction this field is heading.";

const CHALLENGES_TEMPLATE: &str = "\
Based on the following research papers, identify:
1. Open challenges mentioned
2. Limitations of current approaches
3. Future research directions
4. Unresolved questions

Research abstracts:
{abstracts}

Focus on what problems still need to be solved.";

impl AnalysisTask {
    /// Sampling temperature for this analysis
    pub fn temperature(&self) -> f32 {
        match self {
            AnalysisTask::Summary => 0.3,
            AnalysisTask::SimplifiedExplanation => 0.5,
            AnalysisTask::Keywords => 0.2,
            AnalysisTask::Trends | AnalysisTask::OpenChallenges => 0.4,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            AnalysisTask::Summary => SUMMARY_TEMPLATE,
            AnalysisTask::SimplifiedExplanation => SIMPLIFIED_TEMPLATE,
            AnalysisTask::Keywords => KEYWORDS_TEMPLATE,
            AnalysisTask::Trends => TRENDS_TEMPLATE,
            AnalysisTask::OpenChallenges => CHALLENGES_TEMPLATE,
        }
    }

    /// Render the prompt over the already-joined abstracts
    pub fn prompt(&self, abstracts: &str) -> String {
        self.template().replace("{abstracts}", abstracts)
    }

    /// Text stored in place of a failed analysis
    pub fn error_message(&self, error: &LlmError) -> String {
        let action = match self {
            AnalysisTask::Summary => "generating summary",
            AnalysisTask::SimplifiedExplanation => "generating explanation",
            AnalysisTask::Keywords => "extracting keywords",
            AnalysisTask::Trends => "analyzing trends",
            AnalysisTask::OpenChallenges => "identifying challenges",
        };
        format!("Error {}: {}", action, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperatures() {
        assert_eq!(AnalysisTask::Summary.temperature(), 0.3);
        assert_eq!(AnalysisTask::SimplifiedExplanation.temperature(), 0.5);
        assert_eq!(AnalysisTask::Keywords.temperature(), 0.2);
        assert_eq!(AnalysisTask::Trends.temperature(), 0.4);
        assert_eq!(AnalysisTask::OpenChallenges.temperature(), 0.4);
    }

    #[test]
    fn test_prompt_embeds_abstracts_once() {
        for task in AnalysisTask::ALL {
            let prompt = task.prompt("ABSTRACTS-HERE");
            assert_eq!(prompt.matches("ABSTRACTS-HERE").count(), 1, "{}", task);
            assert!(!prompt.contains("{abstracts}"));
        }
        assert!(AnalysisTask::Keywords
            .prompt("x")
            .contains("separated by commas"));
    }

    #[test]
    fn test_error_messages() {
        let err = LlmError::EmptyResponse;
        assert_eq!(
            AnalysisTask::Summary.error_message(&err),
            "Error generating summary: empty response from backend"
        );
        assert!(AnalysisTask::SimplifiedExplanation
            .error_message(&err)
            .starts_with("Error generating explanation: "));
        assert!(AnalysisTask::Trends
            .error_message(&err)
            .starts_with("Error analyzing trends: "));
        assert!(AnalysisTask::OpenChallenges
            .error_message(&err)
            .starts_with("Error identifying challenges: "));
    }
}
