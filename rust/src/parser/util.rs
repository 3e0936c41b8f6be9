use crate::parser::Language;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use syn::{Attribute, Expr, ExprLit, Lit, Meta};

/// Cache key for a file: sha256 over the language tag and the content.
pub fn content_hash(language: Language, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.as_str().as_bytes());
    hasher.update([0x1f_u8]);
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)
}

pub fn compact_whitespace(s: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let re = WS.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    re.replace_all(s.trim(), " ").to_string()
}

/// Join `///` and `#[doc = "..."]` attributes into one string.
pub fn merge_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let mut out = String::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) = &nv.value
            {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(s.value().trim());
            }
        }
    }
    let out = out.trim().to_string();
    (!out.is_empty()).then_some(out)
}

/// Lines `start..=end` (1-based) of `source`.
pub fn lines_between(source: &str, start: usize, end: usize) -> String {
    source
        .lines()
        .skip(start.saturating_sub(1))
        .take(end.saturating_sub(start) + 1)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove the quotes (and any string prefix) from a Python string literal.
pub fn strip_string_literal(raw: &str) -> String {
    let t = raw
        .trim()
        .trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'));
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if t.len() >= 2 * quote.len() && t.starts_with(quote) && t.ends_with(quote) {
            return clean_docstring(&t[quote.len()..t.len() - quote.len()]);
        }
    }
    t.to_string()
}

/// Dedent a docstring body the way Python's `inspect.cleandoc` does.
pub fn clean_docstring(doc: &str) -> String {
    let lines: Vec<&str> = doc.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };
    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = vec![first.trim().to_string()];
    for line in rest {
        let cut = indent.min(indent_width(line));
        out.push(line[cut..].trim_end().to_string());
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    out.join("\n")
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}
