use crate::error::{ParseError, ParseResult};
use crate::parser::util::merge_doc_comments;
use crate::parser::{CodeStructure, Language, SourceParser, Symbol, SymbolKind};
use proc_macro2::Span;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Attribute, ImplItemFn, ItemEnum, ItemFn, ItemImpl, ItemMod, ItemStruct, ItemTrait, ItemUse,
    TraitItemFn, Type, UseTree,
};

pub struct RustParser;

impl SourceParser for RustParser {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn parse(&self, source: &str) -> ParseResult<CodeStructure> {
        let file = syn::parse_file(source).map_err(|e| ParseError::Syntax {
            line: e.span().start().line.max(1),
            message: e.to_string(),
        })?;
        let mut visitor = OutlineVisitor {
            out: CodeStructure::new(self.language()),
            path: Vec::new(),
        };
        visitor.visit_file(&file);
        Ok(visitor.out)
    }
}

struct OutlineVisitor {
    out: CodeStructure,
    /// Enclosing modules, types and functions.
    path: Vec<String>,
}

struct Item<'a> {
    name: String,
    kind: SymbolKind,
    attrs: &'a [Attribute],
    ident_span: Span,
    span: Span,
    signature: String,
    is_async: bool,
}

impl OutlineVisitor {
    fn qualify(&self, name: &str) -> String {
        self.path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join("::")
    }

    fn record(&mut self, item: Item<'_>) {
        let start_line = item.ident_span.start().line;
        let end_line = item.span.end().line.max(start_line);
        let symbol = Symbol {
            qualified_name: self.qualify(&item.name),
            name: item.name,
            kind: item.kind,
            start_line,
            end_line,
            signature: item.signature,
            doc: merge_doc_comments(item.attrs),
            is_async: item.is_async,
        };
        self.out.push_symbol(symbol);
    }

    fn nested<F: FnOnce(&mut Self)>(&mut self, name: String, f: F) {
        self.path.push(name);
        f(self);
        self.path.pop();
    }

    fn collect_use_tree(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.collect_use_tree(&p.tree, prefix);
                prefix.pop();
            }
            UseTree::Name(n) => self.push_use(prefix, &n.ident.to_string()),
            UseTree::Rename(r) => self.push_use(prefix, &r.ident.to_string()),
            UseTree::Glob(_) => self.push_use(prefix, "*"),
            UseTree::Group(g) => {
                for item in &g.items {
                    self.collect_use_tree(item, prefix);
                }
            }
        }
    }

    fn push_use(&mut self, prefix: &[String], last: &str) {
        let full = if last == "self" {
            prefix.join("::")
        } else {
            prefix
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(last))
                .collect::<Vec<_>>()
                .join("::")
        };
        self.out.push_import(&full);
    }
}

/// Last path segment of an impl's self type (`Vec<T>` → `Vec`).
fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_else(|| ty.to_token_stream().to_string()),
        Type::Reference(r) => type_name(&r.elem),
        _ => ty.to_token_stream().to_string(),
    }
}

impl<'ast> Visit<'ast> for OutlineVisitor {
    fn visit_item_mod(&mut self, m: &'ast ItemMod) {
        self.nested(m.ident.to_string(), |v| visit::visit_item_mod(v, m));
    }

    fn visit_item_use(&mut self, u: &'ast ItemUse) {
        self.collect_use_tree(&u.tree, &mut Vec::new());
    }

    fn visit_item_fn(&mut self, f: &'ast ItemFn) {
        let vis = &f.vis;
        let sig = &f.sig;
        self.record(Item {
            name: f.sig.ident.to_string(),
            kind: SymbolKind::Function,
            attrs: &f.attrs,
            ident_span: f.sig.ident.span(),
            span: f.span(),
            signature: quote!(#vis #sig).to_string(),
            is_async: f.sig.asyncness.is_some(),
        });
        self.nested(f.sig.ident.to_string(), |v| visit::visit_item_fn(v, f));
    }

    fn visit_item_struct(&mut self, s: &'ast ItemStruct) {
        let (vis, ident, generics) = (&s.vis, &s.ident, &s.generics);
        self.record(Item {
            name: s.ident.to_string(),
            kind: SymbolKind::Struct,
            attrs: &s.attrs,
            ident_span: s.ident.span(),
            span: s.span(),
            signature: quote!(#vis struct #ident #generics).to_string(),
            is_async: false,
        });
        visit::visit_item_struct(self, s);
    }

    fn visit_item_enum(&mut self, e: &'ast ItemEnum) {
        let (vis, ident, generics) = (&e.vis, &e.ident, &e.generics);
        self.record(Item {
            name: e.ident.to_string(),
            kind: SymbolKind::Enum,
            attrs: &e.attrs,
            ident_span: e.ident.span(),
            span: e.span(),
            signature: quote!(#vis enum #ident #generics).to_string(),
            is_async: false,
        });
        visit::visit_item_enum(self, e);
    }

    fn visit_item_trait(&mut self, t: &'ast ItemTrait) {
        let (vis, ident, generics) = (&t.vis, &t.ident, &t.generics);
        self.record(Item {
            name: t.ident.to_string(),
            kind: SymbolKind::Trait,
            attrs: &t.attrs,
            ident_span: t.ident.span(),
            span: t.span(),
            signature: quote!(#vis trait #ident #generics).to_string(),
            is_async: false,
        });
        self.nested(t.ident.to_string(), |v| visit::visit_item_trait(v, t));
    }

    fn visit_item_impl(&mut self, im: &'ast ItemImpl) {
        self.nested(type_name(&im.self_ty), |v| visit::visit_item_impl(v, im));
    }

    fn visit_impl_item_fn(&mut self, m: &'ast ImplItemFn) {
        let vis = &m.vis;
        let sig = &m.sig;
        self.record(Item {
            name: m.sig.ident.to_string(),
            kind: SymbolKind::Method,
            attrs: &m.attrs,
            ident_span: m.sig.ident.span(),
            span: m.span(),
            signature: quote!(#vis #sig).to_string(),
            is_async: m.sig.asyncness.is_some(),
        });
        self.nested(m.sig.ident.to_string(), |v| visit::visit_impl_item_fn(v, m));
    }

    fn visit_trait_item_fn(&mut self, m: &'ast TraitItemFn) {
        let sig = &m.sig;
        self.record(Item {
            name: m.sig.ident.to_string(),
            kind: SymbolKind::Method,
            attrs: &m.attrs,
            ident_span: m.sig.ident.span(),
            span: m.span(),
            signature: quote!(#sig).to_string(),
            is_async: m.sig.asyncness.is_some(),
        });
        self.nested(m.sig.ident.to_string(), |v| visit::visit_trait_item_fn(v, m));
    }
}
