use crate::error::SummarizeError;
use crate::summarizer::{Snippet, Summarizer};
use async_trait::async_trait;

/// Offline summaries built from docstrings and signatures.
pub struct ExtractiveSummarizer;

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &'static str {
        "extractive"
    }

    async fn summarize(&self, snippet: &Snippet<'_>) -> Result<String, SummarizeError> {
        let symbol = snippet.symbol;
        if let Some(sentence) = symbol.doc.as_deref().and_then(first_sentence) {
            return Ok(sentence);
        }
        Ok(format!(
            "{} `{}` is undocumented; signature: `{}`.",
            symbol.kind.label(),
            symbol.qualified_name,
            symbol.signature
        ))
    }
}

/// First sentence of the first paragraph, terminated with a period.
pub fn first_sentence(doc: &str) -> Option<String> {
    let paragraph = doc
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())?;
    let flat = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    let sentence = match flat.find(". ") {
        Some(i) => &flat[..=i],
        None => flat.as_str(),
    };
    let mut sentence = sentence.trim().to_string();
    if !sentence.ends_with(['.', '!', '?']) {
        sentence.push('.');
    }
    Some(sentence)
}
