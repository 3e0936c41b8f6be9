//! Runtime configuration.
//!
//! Values come from the command line, with environment fallbacks (a `.env`
//! file is loaded first by the binary). These structs are what the library
//! consumes; the clap definitions live in `main.rs`.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_MODEL: &str = "t5-small";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// OpenAI-compatible API root, e.g. `http://127.0.0.1:8080/v1`.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Layout of the data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root.join("analysis_cache.json")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }
}
