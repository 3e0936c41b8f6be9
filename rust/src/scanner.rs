use crate::error::{ParseError, ServiceResult};
use crate::parser::Language;
use crate::service::{Analysis, AnalyzeOptions, Analyzer};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub summarize: bool,
}

const SKIPPED_DIRS: &[&str] = &[
    "target",
    ".git",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    ".tox",
];

fn is_excluded(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        return entry.depth() > 0 && SKIPPED_DIRS.contains(&name.as_ref());
    }
    name.ends_with(".generated.rs") || name.ends_with("_pb2.py")
}

/// Analyze every supported file under `cfg.root`.
///
/// Files that fail to read or parse are logged and skipped; paths in the
/// result are relative to the root.
pub async fn scan_directory(analyzer: &Analyzer, cfg: &ScanConfig) -> ServiceResult<Vec<Analysis>> {
    if !cfg.root.is_dir() {
        return Err(ParseError::Io {
            path: cfg.root.display().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        }
        .into());
    }
    let options = AnalyzeOptions {
        summarize: cfg.summarize,
        record: None,
    };
    let mut out = Vec::new();
    let walker = WalkDir::new(&cfg.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
        .filter_map(|e| e.ok());
    for entry in walker {
        let path = entry.path();
        if !entry.file_type().is_file() || Language::from_path(path).is_none() {
            continue;
        }
        let rel_path = relative_path(&cfg.root, path);
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping {}: {}", rel_path, e);
                continue;
            }
        };
        match analyzer.analyze(&rel_path, bytes, &options).await {
            Ok(analysis) => out.push(analysis),
            Err(e) => warn!("Skipping {}: {}", rel_path, e),
        }
    }
    Ok(out)
}

fn relative_path(root: &Path, file: &Path) -> String {
    pathdiff::diff_paths(file, root)
        .unwrap_or_else(|| file.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

/// Write analyses as a JSON array.
pub fn write_json(analyses: &[Analysis], out: &mut dyn Write) -> io::Result<()> {
    let mut buf = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut buf, analyses)?;
    buf.write_all(b"\n")?;
    buf.flush()
}
