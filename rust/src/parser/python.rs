//! Python outlines via tree-sitter.
//!
//! Definitions are collected breadth-first over statements, so `functions`
//! and `classes` come out in the same order Python's own `ast.walk` yields
//! them: every top-level definition first, then the bodies one level down.

use crate::error::{ParseError, ParseResult};
use crate::parser::util::{compact_whitespace, strip_string_literal};
use crate::parser::{CodeStructure, Language, SourceParser, Symbol, SymbolKind};
use std::collections::VecDeque;
use tree_sitter::{Node, Parser};

pub struct PythonParser;

#[derive(Clone)]
struct Scope {
    name: String,
    is_class: bool,
}

impl SourceParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn parse(&self, source: &str) -> ParseResult<CodeStructure> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::Setup(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Setup("parser produced no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(first_syntax_error(root, source));
        }

        let mut out = CodeStructure::new(self.language());
        collect_imports(root, source, &mut out);

        let mut queue: VecDeque<(Step, Vec<Scope>)> = VecDeque::new();
        queue.push_back((Step::Node(root), Vec::new()));
        while let Some((step, scope)) = queue.pop_front() {
            let mut inner = scope.clone();
            let children = match step {
                Step::Node(node) => {
                    if matches!(node.kind(), "function_definition" | "class_definition") {
                        if let Some(symbol) = definition_symbol(node, source, &scope) {
                            inner.push(Scope {
                                name: symbol.name.clone(),
                                is_class: symbol.kind == SymbolKind::Class,
                            });
                            out.push_symbol(symbol);
                        }
                    }
                    statement_children(node)
                }
                Step::Branches(branches) => branch_children(&branches),
            };
            for child in children {
                queue.push_back((child, inner.clone()));
            }
        }
        Ok(out)
    }
}

/// One unit of the breadth-first walk.
///
/// `Branches` is an `elif` chain. Python nests each `elif` as an `if` inside
/// the previous branch's `orelse`, and a trailing `else:` body inside the
/// last `elif`, so the chain is unrolled one level per step.
enum Step<'t> {
    Node(Node<'t>),
    Branches(Vec<Node<'t>>),
}

/// Named children with grammar-only wrappers flattened away, so nesting depth
/// counts statements rather than grammar nodes. `block`, `else_clause` and
/// `finally_clause` add no level; `except_clause` does (it is its own handler
/// node in Python).
fn statement_children(node: Node) -> Vec<Step> {
    let mut out = Vec::new();
    let mut branches = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "elif_clause" => branches.push(child),
            "else_clause" if !branches.is_empty() => branches.push(child),
            "block" | "else_clause" | "finally_clause" => out.extend(statement_children(child)),
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    out.push(Step::Node(def));
                }
            }
            _ => out.push(Step::Node(child)),
        }
    }
    if !branches.is_empty() {
        out.push(Step::Branches(branches));
    }
    out
}

/// Children of the `if` formed by the first `elif` in `branches`: its own
/// condition and body, then the rest of the chain as its `orelse`.
fn branch_children<'t>(branches: &[Node<'t>]) -> Vec<Step<'t>> {
    let Some((head, rest)) = branches.split_first() else {
        return Vec::new();
    };
    let mut out = statement_children(*head);
    match rest.first() {
        Some(next) if next.kind() == "elif_clause" => out.push(Step::Branches(rest.to_vec())),
        Some(last) => out.extend(statement_children(*last)),
        None => {}
    }
    out
}

fn definition_symbol(node: Node, source: &str, scope: &[Scope]) -> Option<Symbol> {
    let name = node
        .child_by_field_name("name")?
        .utf8_text(source.as_bytes())
        .ok()?
        .to_string();
    let is_class = node.kind() == "class_definition";
    let kind = if is_class {
        SymbolKind::Class
    } else if scope.last().is_some_and(|s| s.is_class) {
        SymbolKind::Method
    } else {
        SymbolKind::Function
    };
    // Coroutines are listed with plain functions and flagged here.
    let is_async = !is_class && node.child(0).is_some_and(|c| c.kind() == "async");

    let qualified_name = scope
        .iter()
        .map(|s| s.name.as_str())
        .chain(std::iter::once(name.as_str()))
        .collect::<Vec<_>>()
        .join(".");

    let body = node.child_by_field_name("body");
    let header_end = body.map_or(node.end_byte(), |b| b.start_byte());
    let header = source
        .get(node.start_byte()..header_end)
        .unwrap_or_default()
        .trim_end()
        .trim_end_matches(':');
    let doc = body.and_then(|b| docstring(b, source));

    Some(Symbol {
        name,
        qualified_name,
        kind,
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        signature: compact_whitespace(header),
        doc,
        is_async,
    })
}

fn docstring(body: Node, source: &str) -> Option<String> {
    let first = body.named_child(0)?;
    let literal = match first.kind() {
        "expression_statement" => first.named_child(0).filter(|n| n.kind() == "string")?,
        "string" => first,
        _ => return None,
    };
    let text = literal.utf8_text(source.as_bytes()).ok()?;
    let doc = strip_string_literal(text);
    (!doc.is_empty()).then_some(doc)
}

fn collect_imports(root: Node, source: &str, out: &mut CodeStructure) {
    let bytes = source.as_bytes();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    let module = if name.kind() == "aliased_import" {
                        name.child_by_field_name("name")
                    } else {
                        Some(name)
                    };
                    if let Some(text) = module.and_then(|m| m.utf8_text(bytes).ok()) {
                        out.push_import(text);
                    }
                }
            }
            "import_from_statement" => {
                if let Some(text) = node
                    .child_by_field_name("module_name")
                    .and_then(|m| m.utf8_text(bytes).ok())
                {
                    out.push_import(text);
                }
            }
            "future_import_statement" => out.push_import("__future__"),
            _ => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }
}

fn first_syntax_error(root: Node, source: &str) -> ParseError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return ParseError::Syntax {
                line: node.start_position().row + 1,
                message: format!("expected '{}'", node.kind()),
            };
        }
        if node.is_error() {
            let row = node.start_position().row;
            let near = source.lines().nth(row).unwrap_or_default().trim();
            return ParseError::Syntax {
                line: row + 1,
                message: format!("invalid syntax near `{}`", near),
            };
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    ParseError::Syntax {
        line: 1,
        message: "invalid syntax".to_string(),
    }
}
