//! Summaries from an OpenAI-compatible chat completions endpoint.
//! Works against local servers (llama.cpp, Ollama) as well as hosted APIs.

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::summarizer::{build_prompt, Snippet, Summarizer, MAX_SUMMARY_TOKENS};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You summarize source code. Reply with one short plain-English sentence describing what the function does.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct ChatSummarizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl ChatSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let base_url = config.base_url.clone().unwrap_or_default();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn summarize(&self, snippet: &Snippet<'_>) -> Result<String, SummarizeError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_prompt(snippet),
                },
            ],
            temperature: 0.2,
            max_tokens: MAX_SUMMARY_TOKENS,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(SummarizeError::EmptyResponse)?
            .message
            .content;
        Ok(summary.trim().to_string())
    }
}
