//! Natural-language summaries of functions.
//!
//! A [`Summarizer`] is built once at startup and shared by every request.
//! [`summarize_code_snippet`] is the entry point callers use: it never fails,
//! a backend error comes back as an `"Error: ..."` string.

pub mod chat;
pub mod extractive;

pub use chat::ChatSummarizer;
pub use extractive::ExtractiveSummarizer;

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::parser::{Language, Symbol};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Input budget for the model, roughly 512 tokens.
pub const MAX_INPUT_CHARS: usize = 2048;
/// Output budget for one summary.
pub const MAX_SUMMARY_TOKENS: u32 = 50;
/// Prefix marking a summary that failed.
pub const ERROR_PREFIX: &str = "Error:";

/// A function to summarize: its source text plus what the parser knows about it.
#[derive(Debug, Clone, Copy)]
pub struct Snippet<'a> {
    pub language: Language,
    pub code: &'a str,
    pub symbol: &'a Symbol,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn summarize(&self, snippet: &Snippet<'_>) -> Result<String, SummarizeError>;
}

/// Summarize one snippet, turning any failure into an `"Error: ..."` string.
pub async fn summarize_code_snippet(summarizer: &dyn Summarizer, snippet: &Snippet<'_>) -> String {
    match summarizer.summarize(snippet).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(
                "summarizer {} failed on {}: {}",
                summarizer.name(),
                snippet.symbol.qualified_name,
                e
            );
            format!("{} {}", ERROR_PREFIX, e)
        }
    }
}

pub fn build_prompt(snippet: &Snippet<'_>) -> String {
    format!(
        "summarize this {} function: {}",
        snippet.language,
        truncate_chars(snippet.code, MAX_INPUT_CHARS)
    )
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Pick the backend: a chat model when an endpoint is configured, otherwise
/// the offline extractive summarizer.
pub fn build_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>, SummarizeError> {
    match &config.base_url {
        Some(base_url) => {
            info!("Using chat summarizer at {} (model {})", base_url, config.model);
            Ok(Arc::new(ChatSummarizer::new(config)?))
        }
        None => {
            info!("No summarizer endpoint configured, using extractive summaries");
            Ok(Arc::new(ExtractiveSummarizer))
        }
    }
}
