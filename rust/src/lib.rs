pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod parser;
pub mod scanner;
pub mod server;
pub mod service;
pub mod summarizer;

// Re-export main types and functions
pub use error::{ParseError, ServiceError, StoreError, SummarizeError};
pub use parser::{parse_code_structure, parse_source, CodeStructure, Language, Symbol, SymbolKind};
pub use service::{Analysis, AnalyzeOptions, Analyzer};
pub use summarizer::{summarize_code_snippet, Summarizer};
