use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dotenv::dotenv;
use repo_lens::cache::AnalysisCache;
use repo_lens::config::{
    DataPaths, ServerConfig, SummarizerConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL, DEFAULT_PORT,
};
use repo_lens::history::{HistoryStore, RecordSource};
use repo_lens::scanner::{scan_directory, write_json, ScanConfig};
use repo_lens::server::{self, AppState};
use repo_lens::summarizer::build_summarizer;
use repo_lens::{Analysis, AnalyzeOptions, Analyzer};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repo-lens", version, about = "Outline, summarize and record source files")]
struct Cli {
    /// Directory for the analysis cache and history
    #[arg(long, global = true, env = "REPO_LENS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(flatten)]
    summarizer: SummarizerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SummarizerArgs {
    /// OpenAI-compatible API root used for summaries (offline summaries when unset)
    #[arg(long, global = true, env = "SUMMARIZER_BASE_URL")]
    summarizer_url: Option<String>,

    /// Bearer token for the summarizer endpoint
    #[arg(long, global = true, env = "SUMMARIZER_API_KEY", hide_env_values = true)]
    summarizer_key: Option<String>,

    /// Model name sent to the summarizer endpoint
    #[arg(long, global = true, env = "SUMMARIZER_MODEL", default_value = DEFAULT_MODEL)]
    summarizer_model: String,
}

impl SummarizerArgs {
    fn into_config(self) -> SummarizerConfig {
        SummarizerConfig {
            base_url: self.summarizer_url.filter(|u| !u.trim().is_empty()),
            api_key: self.summarizer_key.filter(|k| !k.trim().is_empty()),
            model: self.summarizer_model,
            ..SummarizerConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local web server
    Serve {
        #[arg(long, env = "REPO_LENS_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, env = "REPO_LENS_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Where uploaded files are kept
        #[arg(long, env = "REPO_LENS_UPLOAD_DIR", default_value = "uploads")]
        upload_dir: PathBuf,

        #[arg(long, env = "REPO_LENS_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },
    /// Analyze a single file
    Analyze {
        /// Path to a Python or Rust source file
        file: PathBuf,

        /// Summarize every function
        #[arg(short, long)]
        summarize: bool,

        /// Print JSON instead of a text outline
        #[arg(long)]
        json: bool,
    },
    /// Analyze every supported file under a directory
    Scan {
        dir: PathBuf,

        /// Output file for the JSON array (default stdout)
        #[arg(long, value_name = "file")]
        out: Option<PathBuf>,

        /// Summarize every function
        #[arg(short, long)]
        summarize: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repo_lens=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_analyzer(data: &DataPaths, summarizer: SummarizerConfig, with_history: bool) -> Result<Analyzer> {
    let cache_file = data.cache_file();
    let cache = AnalysisCache::load(&cache_file)
        .with_context(|| format!("Failed to load cache {}", cache_file.display()))?;
    if cache.is_empty() {
        info!("Starting with an empty analysis cache at {}", cache_file.display());
    } else {
        info!("Reusing {} cached analyses from {}", cache.len(), cache_file.display());
    }
    let summarizer = build_summarizer(&summarizer).context("Failed to build summarizer")?;
    let analyzer = Analyzer::new(cache, summarizer);
    if !with_history {
        return Ok(analyzer);
    }
    let history_dir = data.history_dir();
    let history = HistoryStore::open(&history_dir)
        .with_context(|| format!("Failed to open history at {}", history_dir.display()))?;
    Ok(analyzer.with_history(history))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let data = DataPaths::new(&cli.data_dir);
    let summarizer = cli.summarizer.into_config();

    match cli.command {
        Commands::Serve {
            host,
            port,
            upload_dir,
            max_upload_bytes,
        } => {
            let config = ServerConfig {
                host,
                port,
                upload_dir,
                max_upload_bytes,
            };
            let analyzer = build_analyzer(&data, summarizer, true)?;
            let state = AppState {
                analyzer: Arc::new(analyzer),
                upload_dir: Arc::new(config.upload_dir.clone()),
            };
            let app = server::router(state, config.max_upload_bytes);
            server::serve(config.addr(), app)
                .await
                .with_context(|| format!("Server on {} failed", config.addr()))?;
        }
        Commands::Analyze {
            file,
            summarize,
            json,
        } => {
            let analyzer = build_analyzer(&data, summarizer, true)?;
            let bytes = fs::read(&file).with_context(|| format!("Failed to read file: {}", file.display()))?;
            let options = AnalyzeOptions {
                summarize,
                record: Some(RecordSource::Cli),
            };
            let analysis = analyzer
                .analyze(&file.to_string_lossy(), bytes, &options)
                .await
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_outline(&analysis);
            }
        }
        Commands::Scan { dir, out, summarize } => {
            let analyzer = build_analyzer(&data, summarizer, false)?;
            let cfg = ScanConfig { root: dir, summarize };
            let analyses = scan_directory(&analyzer, &cfg).await?;
            match out {
                Some(p) => {
                    let f = File::create(&p).with_context(|| format!("Failed to create {}", p.display()))?;
                    write_json(&analyses, &mut BufWriter::new(f))?;
                    eprintln!("{} {} files -> {}", "Scanned".green(), analyses.len(), p.display());
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    write_json(&analyses, &mut stdout)?;
                }
            }
        }
    }

    Ok(())
}

fn print_outline(analysis: &Analysis) {
    let structure = &analysis.structure;
    println!(
        "{}",
        format!("{} ({})", analysis.filename, structure.language).bold().blue()
    );
    if analysis.cached {
        println!("{}", "  (from cache)".dimmed());
    }

    if !structure.imports.is_empty() {
        println!("{}", "Imports:".bold());
        for import in &structure.imports {
            println!("  {}", import.bright_black());
        }
    }

    println!("{}", "Definitions:".bold());
    if structure.symbols.is_empty() {
        println!("{}", "  No functions or classes found.".yellow());
    }
    for symbol in &structure.symbols {
        let kind = symbol.kind.label().to_lowercase();
        println!(
            "  {:<8} {} {}",
            kind.cyan(),
            symbol.qualified_name.bright_white(),
            format!("[{}-{}]", symbol.start_line, symbol.end_line).dimmed()
        );
        if let Some(summary) = analysis
            .summaries
            .as_ref()
            .and_then(|m| m.get(&symbol.qualified_name))
        {
            println!("           {}", summary.green());
        }
    }

    println!(
        "{}",
        format!(
            "Total: {} functions, {} classes",
            structure.functions.len(),
            structure.classes.len()
        )
        .green()
    );
}
