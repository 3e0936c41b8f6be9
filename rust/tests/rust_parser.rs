use repo_lens::{parse_source, Language, ParseError, SymbolKind};

const POINT: &str = include_str!("fixtures/point.rs");

#[test]
fn extracts_items_in_source_order() {
    let structure = parse_source(Language::Rust, POINT).expect("parse should succeed");

    assert_eq!(structure.language, Language::Rust);
    assert_eq!(structure.functions, vec!["new", "sum", "length", "origin", "load"]);
    assert_eq!(structure.classes, vec!["Point", "Direction", "Measure"]);

    let kinds: Vec<(String, SymbolKind)> = structure
        .symbols
        .iter()
        .map(|s| (s.qualified_name.clone(), s.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("Point".to_string(), SymbolKind::Struct),
            ("Point::new".to_string(), SymbolKind::Method),
            ("Point::sum".to_string(), SymbolKind::Method),
            ("Direction".to_string(), SymbolKind::Enum),
            ("Measure".to_string(), SymbolKind::Trait),
            ("Measure::length".to_string(), SymbolKind::Method),
            ("origin".to_string(), SymbolKind::Function),
            ("io::load".to_string(), SymbolKind::Function),
        ]
    );
}

#[test]
fn doc_comments_and_lines_are_populated() {
    let structure = parse_source(Language::Rust, POINT).unwrap();
    for symbol in &structure.symbols {
        assert!(
            symbol.doc.as_deref().is_some_and(|d| !d.is_empty()),
            "doc should be populated for {}",
            symbol.qualified_name
        );
        assert!(!symbol.signature.is_empty());
        assert!(symbol.start_line <= symbol.end_line);
    }

    let new = structure.symbols.iter().find(|s| s.name == "new").unwrap();
    assert_eq!(new.doc.as_deref(), Some("Create a new Point"));
    assert_eq!((new.start_line, new.end_line), (17, 19));

    let load = structure.symbols.iter().find(|s| s.name == "load").unwrap();
    assert!(load.is_async);
}

#[test]
fn use_trees_are_flattened() {
    let structure = parse_source(Language::Rust, POINT).unwrap();
    assert_eq!(structure.imports, vec!["std::fmt", "std::ops::Add", "std::ops::Sub"]);
}

#[test]
fn invalid_rust_is_a_syntax_error() {
    let err = parse_source(Language::Rust, "fn main( {").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
}
