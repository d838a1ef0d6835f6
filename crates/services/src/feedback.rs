use peopledesk_config::AiSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("AI feedback analysis is not configured")]
    NotConfigured,
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI response could not be parsed: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackAnalysis {
    pub themes: Vec<String>,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

const PROMPT: &str = concat!(
    "You are analysing employee feedback for an HR team. ",
    "Group the feedback below into its main themes, judge the overall sentiment, ",
    "quote short representative examples and propose concrete suggestions. ",
    "Return a JSON object with these fields:\n",
    "- \"themes\": array of short theme names\n",
    "- \"sentiment\": one of \"positive\", \"neutral\", \"negative\", \"mixed\"\n",
    "- \"examples\": array of short quotes from the feedback\n",
    "- \"suggestions\": array of actionable suggestions\n",
    "Return ONLY the JSON, no markdown fences.\n\nFeedback:\n"
);

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeedbackAnalyzer {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl FeedbackAnalyzer {
    pub fn new(settings: &AiSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Categorise free-text feedback into themes, sentiment and suggestions.
    pub async fn analyze(&self, feedback: &str) -> Result<FeedbackAnalysis, FeedbackError> {
        let api_key = self.api_key.as_ref().ok_or(FeedbackError::NotConfigured)?;

        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ClaudeMessage {
                role: "user",
                content: format!("{PROMPT}{feedback}"),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| FeedbackError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Feedback analysis request rejected");
            return Err(FeedbackError::Request(format!("{}: {}", status, body)));
        }

        let claude_resp: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| FeedbackError::MalformedResponse(e.to_string()))?;

        let text = claude_resp
            .content
            .iter()
            .find_map(|c| c.text.as_deref())
            .ok_or_else(|| FeedbackError::MalformedResponse("no text block".to_string()))?;

        debug!(chars = text.len(), "Feedback analysis received");
        parse_analysis(text)
    }
}

/// Parses the model output, tolerating a surrounding markdown code fence.
pub fn parse_analysis(text: &str) -> Result<FeedbackAnalysis, FeedbackError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| FeedbackError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string, e.g. ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
