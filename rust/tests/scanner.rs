use regex::Regex;
use repo_lens::cache::AnalysisCache;
use repo_lens::scanner::{scan_directory, write_json, ScanConfig};
use repo_lens::summarizer::ExtractiveSummarizer;
use repo_lens::Analyzer;
use serde_json::Value;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn scans_supported_files_and_skips_the_rest() {
    // Prepare a temporary project using the fixture content
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("target/debug")).unwrap();
    fs::create_dir_all(root.join("__pycache__")).unwrap();
    fs::write(root.join("src/point.rs"), include_str!("fixtures/point.rs")).unwrap();
    fs::write(root.join("pkg/sample.py"), include_str!("fixtures/sample.py")).unwrap();
    fs::write(root.join("pkg/broken.py"), include_str!("fixtures/broken.py")).unwrap();
    fs::write(root.join("README.md"), "# readme").unwrap();
    fs::write(root.join("target/debug/build.rs"), "fn main() {}").unwrap();
    fs::write(root.join("__pycache__/cached.py"), "def stale(): pass").unwrap();

    let analyzer = Analyzer::new(AnalysisCache::in_memory(), Arc::new(ExtractiveSummarizer));
    let cfg = ScanConfig {
        root: root.to_path_buf(),
        summarize: true,
    };
    let analyses = scan_directory(&analyzer, &cfg).await.expect("scan should succeed");

    let paths: Vec<&str> = analyses.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(paths, vec!["pkg/sample.py", "src/point.rs"]);

    let hex64 = Regex::new(r"^[0-9a-f]{64}$").unwrap();
    for analysis in &analyses {
        assert!(hex64.is_match(&analysis.content_hash), "hash must be 64-char hex");
        let summaries = analysis.summaries.as_ref().expect("summaries requested");
        assert_eq!(summaries.len(), analysis.structure.functions.len());
    }

    let mut out = Vec::new();
    write_json(&analyses, &mut out).unwrap();
    let parsed: Value = serde_json::from_slice(&out).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["structure"]["language"], "rust");
    assert_eq!(items[1]["structure"]["symbols"][0]["kind"], "struct");
}

#[tokio::test]
async fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(AnalysisCache::in_memory(), Arc::new(ExtractiveSummarizer));
    let cfg = ScanConfig {
        root: dir.path().join("nope"),
        summarize: false,
    };
    assert!(scan_directory(&analyzer, &cfg).await.is_err());
}
