use crate::error::Result;
use crate::models::applicant_results::ApplicantResults;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;

const SYSTEM_PROMPT: &str = r#"You are a senior technical interviewer reviewing an applicant's assessment.
You receive the applicant's technical test results (score, per-category statistics and every graded question)
and personality test results (category scores and every answered statement).

Write a concise evaluation for the hiring team. Respond with a single JSON object and nothing else:
{
  "technicalAnalysis": "<paragraph>",
  "personalityAnalysis": "<paragraph>",
  "strengths": "<sentence or two>",
  "weaknesses": "<sentence or two>",
  "overallAssessment": "<paragraph>",
  "interviewFocus": "<what the interviewers should dig into>",
  "recommendation": "high" | "medium" | "low",
  "recommendationReason": "<one or two sentences>"
}
Every value must be a plain string. Do not use arrays or nested objects."#;

/// Produces the free-form narrative for an applicant. Output is untrusted
/// and goes through recovery before use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, input: &ApplicantResults) -> Result<String>;
}

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl AIService {
    pub fn new(api_key: String, api_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            api_url,
            model,
        }
    }

    pub fn build_payload(&self, input: &ApplicantResults) -> Result<JsonValue> {
        Ok(serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": serde_json::to_string(input)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.4
        }))
    }

    /// Returns the raw message content of the first choice.
    async fn chat_openai(&self, payload: JsonValue) -> Result<String> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }
}

#[async_trait]
impl NarrativeGenerator for AIService {
    async fn generate(&self, input: &ApplicantResults) -> Result<String> {
        let payload = self.build_payload(input)?;
        tracing::info!(model = %self.model, "requesting assessment narrative");
        self.chat_openai(payload).await
    }
}
