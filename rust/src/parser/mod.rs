//! Structural outline extraction.
//!
//! Each supported language has a [`SourceParser`] that turns source text into
//! a [`CodeStructure`]: the functions, classes and imports of one file.

pub mod python;
pub mod rust;
pub mod util;

use crate::error::{ParseError, ParseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
}

impl Language {
    /// Detect the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "py" | "pyi" => Some(Self::Python),
            "rs" => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Trait,
}

impl SymbolKind {
    /// Whether symbols of this kind are listed under `functions`.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Method => "Method",
            Self::Class => "Class",
            Self::Struct => "Struct",
            Self::Enum => "Enum",
            Self::Trait => "Trait",
        }
    }
}

/// A single definition found in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// Name prefixed with its enclosing definitions (`Class.method`, `Type::method`).
    pub qualified_name: String,
    pub kind: SymbolKind,
    /// 1-based, inclusive.
    pub start_line: usize,
    /// 1-based, inclusive.
    pub end_line: usize,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub is_async: bool,
}

/// Outline of one source file.
///
/// `functions` and `classes` hold bare names in discovery order, duplicates
/// kept; `symbols` carries the full detail for the same definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeStructure {
    pub language: Language,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
    pub symbols: Vec<Symbol>,
}

impl CodeStructure {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub(crate) fn push_symbol(&mut self, symbol: Symbol) {
        if symbol.kind.is_callable() {
            self.functions.push(symbol.name.clone());
        } else {
            self.classes.push(symbol.name.clone());
        }
        self.symbols.push(symbol);
    }

    pub(crate) fn push_import(&mut self, import: &str) {
        let import = import.trim();
        if !import.is_empty() && !self.imports.iter().any(|i| i == import) {
            self.imports.push(import.to_string());
        }
    }

    /// Functions and methods, in discovery order.
    pub fn callables(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.kind.is_callable())
    }
}

/// Turns source text of one language into a [`CodeStructure`] tagged with
/// [`SourceParser::language`].
pub trait SourceParser {
    fn language(&self) -> Language;
    fn parse(&self, source: &str) -> ParseResult<CodeStructure>;
}

pub fn parser_for(language: Language) -> Box<dyn SourceParser> {
    match language {
        Language::Python => Box::new(python::PythonParser),
        Language::Rust => Box::new(rust::RustParser),
    }
}

pub fn parse_source(language: Language, source: &str) -> ParseResult<CodeStructure> {
    parser_for(language).parse(source)
}

/// Read a file from disk and return its outline.
pub fn parse_code_structure(path: impl AsRef<Path>) -> ParseResult<CodeStructure> {
    let path = path.as_ref();
    let language = Language::from_path(path)
        .ok_or_else(|| ParseError::UnsupportedLanguage(path.display().to_string()))?;
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_source(language, &source)
}
