use repo_lens::{parse_code_structure, parse_source, Language, ParseError, SymbolKind};
use std::fs;

const SAMPLE: &str = include_str!("fixtures/sample.py");

#[test]
fn lists_functions_and_classes_breadth_first() {
    let structure = parse_source(Language::Python, SAMPLE).expect("sample parses");

    assert_eq!(structure.language, Language::Python);
    assert_eq!(
        structure.functions,
        vec!["check_palindrome", "fetch_words", "decorated", "__init__", "add", "clamp"]
    );
    assert_eq!(structure.classes, vec!["Scoreboard", "Entry"]);
}

#[test]
fn qualifies_methods_and_nested_definitions() {
    let structure = parse_source(Language::Python, SAMPLE).unwrap();
    let find = |q: &str| {
        structure
            .symbols
            .iter()
            .find(|s| s.qualified_name == q)
            .unwrap_or_else(|| panic!("missing {q}"))
    };

    assert_eq!(find("Scoreboard.__init__").kind, SymbolKind::Method);
    assert_eq!(find("Scoreboard.add").kind, SymbolKind::Method);
    assert_eq!(find("Scoreboard.add.clamp").kind, SymbolKind::Function);
    assert_eq!(find("Scoreboard.Entry").kind, SymbolKind::Class);
    assert_eq!(find("check_palindrome").kind, SymbolKind::Function);
}

#[test]
fn records_lines_signatures_and_docstrings() {
    let structure = parse_source(Language::Python, SAMPLE).unwrap();
    let palindrome = structure
        .symbols
        .iter()
        .find(|s| s.name == "check_palindrome")
        .unwrap();
    assert_eq!((palindrome.start_line, palindrome.end_line), (8, 11));
    assert_eq!(palindrome.signature, "def check_palindrome(word)");
    assert_eq!(palindrome.doc.as_deref(), Some("Check if a word is a palindrome."));
    assert!(!palindrome.is_async);

    let board = structure.symbols.iter().find(|s| s.name == "Scoreboard").unwrap();
    assert_eq!((board.start_line, board.end_line), (14, 27));
    assert_eq!(board.signature, "class Scoreboard");
    assert_eq!(board.doc.as_deref(), Some("Keeps a running score per player."));

    let init = structure.symbols.iter().find(|s| s.name == "__init__").unwrap();
    assert_eq!(init.doc, None);

    let fetch = structure.symbols.iter().find(|s| s.name == "fetch_words").unwrap();
    assert!(fetch.is_async);
    assert_eq!(fetch.signature, "async def fetch_words(source)");

    let decorated = structure.symbols.iter().find(|s| s.name == "decorated").unwrap();
    assert_eq!(decorated.start_line, 35);
}

#[test]
fn collects_imported_modules_in_order() {
    let structure = parse_source(Language::Python, SAMPLE).unwrap();
    assert_eq!(
        structure.imports,
        vec!["os", "collections.abc", "typing", ".helpers"]
    );
}

#[test]
fn syntax_errors_are_reported() {
    let err = parse_source(Language::Python, include_str!("fixtures/broken.py")).unwrap_err();
    match err {
        ParseError::Syntax { line, message } => {
            assert!(line >= 1);
            assert!(!message.is_empty());
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn empty_file_has_empty_outline() {
    let structure = parse_source(Language::Python, "").unwrap();
    assert!(structure.functions.is_empty());
    assert!(structure.classes.is_empty());
    assert!(structure.symbols.is_empty());
}

#[test]
fn parses_files_from_disk_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let py = dir.path().join("Sample1.py");
    fs::write(&py, "def check_palindrome(word):\n    return word == word[::-1]\n").unwrap();
    let structure = parse_code_structure(&py).unwrap();
    assert_eq!(structure.functions, vec!["check_palindrome"]);

    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "hello").unwrap();
    assert!(matches!(
        parse_code_structure(&txt),
        Err(ParseError::UnsupportedLanguage(_))
    ));

    assert!(matches!(
        parse_code_structure(dir.path().join("missing.py")),
        Err(ParseError::Io { .. })
    ));
}

#[test]
fn branch_bodies_follow_python_nesting() {
    let structure = parse_source(Language::Python, include_str!("fixtures/branches.py")).unwrap();

    // `else`/`finally` bodies sit directly on their statement; `except`
    // handlers and each `elif` add one level.
    assert_eq!(
        structure.functions,
        vec![
            "outer",
            "on_windows",
            "load",
            "with_json",
            "cleanup",
            "after_loop",
            "inner",
            "on_mac",
            "on_other",
            "fallback",
        ]
    );
    assert_eq!(structure.classes, vec!["Loader"]);
}

#[test]
fn else_and_finally_add_no_depth() {
    let source = "if X:\n    pass\nelse:\n    def b(): pass\nclass K:\n    def m(self): pass\ntry:\n    pass\nfinally:\n    def f(): pass\ndef g():\n    def h(): pass\n";
    let structure = parse_source(Language::Python, source).unwrap();
    assert_eq!(structure.functions, vec!["g", "b", "m", "f", "h"]);
}
