//! # ecg-ingest
//!
//! Command-line front end for the ecg-ingest library.
//!
//! ## Usage
//!
//! ```bash
//! # Identify files by content
//! ecg-ingest classify upload.bin study.xml --format json
//!
//! # Recover the PDF embedded in one XML export
//! ecg-ingest extract ftp_data/study.xml
//!
//! # Recover PDFs from every XML export in the storage directory
//! ecg-ingest extract
//!
//! # Receive uploads over HTTP
//! ecg-ingest serve -H 0.0.0.0 -p 8080
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ecg_ingest::core::io::{list_files_with_extension, read_file_async, read_file_sync, validate_file_exists};
use ecg_ingest::storage::naming::{extracted_file_name, strip_extension};
use ecg_ingest::{IngestConfig, extract_embedded_document, process_bytes};

/// Identify ECG recorder uploads and recover embedded PDF reports
#[derive(Parser)]
#[command(name = "ecg-ingest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON). Discovered from ecg-ingest.toml when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v for debug, -vv for trace). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify files by content
    Classify {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Extract embedded PDFs from XML exports
    Extract {
        /// XML file, or directory whose .xml files are processed (default: storage directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Write extracted PDFs here instead of next to their XML file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the HTTP upload server
    #[cfg(feature = "api")]
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = IngestConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Classify { files, format } => classify_files(&files, format).await,
        Commands::Extract { path, output_dir } => {
            let path = path.unwrap_or_else(|| config.storage.directory.clone());
            if path.is_dir() {
                extract_directory(&path, output_dir.as_deref())
            } else {
                extract_file(&path, output_dir.as_deref())
            }
        }
        #[cfg(feature = "api")]
        Commands::Serve {
            host,
            port,
            storage_dir,
        } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = storage_dir {
                config.storage.directory = dir;
            }

            ecg_ingest::api::serve(config).await.context("Upload server failed")
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn classify_files(files: &[PathBuf], format: OutputFormat) -> Result<()> {
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let bytes = read_file_async(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let result = process_bytes(&bytes);

        match format {
            OutputFormat::Text => {
                println!("{}: {} ({})", file.display(), result.format.label(), result.format.mime_type());
                if let Some(encoding) = result.encoding {
                    println!("  encoding: {}", encoding);
                }
                if let Some(document) = result.extracted_document() {
                    println!("  embedded PDF: {} bytes", document.len());
                } else if let Some(failure) = result.extraction_failure() {
                    println!("  embedded PDF: none ({})", failure);
                }
            }
            OutputFormat::Json => reports.push(serde_json::json!({
                "file": file.display().to_string(),
                "report": result.report(),
            })),
        }
    }

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn extract_file(file: &Path, output_dir: Option<&Path>) -> Result<()> {
    validate_file_exists(file)?;

    let bytes = read_file_sync(file)?;
    let document = extract_embedded_document(&bytes)
        .map_err(|failure| anyhow::anyhow!("Could not extract PDF from {}: {}", file.display(), failure))?;

    let target = extracted_path(file, output_dir)?;
    std::fs::write(&target, document.bytes()).with_context(|| format!("Failed to write {}", target.display()))?;

    println!("PDF extracted: {} ({} bytes)", target.display(), document.len());
    Ok(())
}

fn extract_directory(dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let files = list_files_with_extension(dir, "xml")?;
    if files.is_empty() {
        bail!("No XML files found in {}", dir.display());
    }

    println!("Found {} XML file(s) in {}", files.len(), dir.display());

    let summary = extract_files(&files, output_dir)?;

    println!();
    println!("Files processed: {}", summary.processed);
    println!("PDFs extracted: {}", summary.extracted);
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ExtractSummary {
    processed: usize,
    extracted: usize,
}

/// Extract every file in turn. A file that cannot be read or holds no PDF is
/// reported and skipped.
fn extract_files(files: &[PathBuf], output_dir: Option<&Path>) -> Result<ExtractSummary> {
    let mut summary = ExtractSummary::default();

    for file in files {
        summary.processed += 1;

        let bytes = match read_file_sync(file) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(file = %file.display(), error = %err, "could not read XML file");
                println!("[NO] {}: {}", file.display(), err);
                continue;
            }
        };

        match extract_embedded_document(&bytes) {
            Ok(document) => {
                let target = extracted_path(file, output_dir)?;
                std::fs::write(&target, document.bytes())
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                println!("[OK] {} -> {}", file.display(), target.display());
                summary.extracted += 1;
            }
            Err(failure) => {
                tracing::debug!(file = %file.display(), kind = failure.kind(), "no embedded PDF");
                println!("[NO] {}: {}", file.display(), failure);
            }
        }
    }

    Ok(summary)
}

fn extracted_path(file: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Unsupported file name: {}", file.display()))?;
    let target_name = extracted_file_name(strip_extension(name));

    let dir = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
            dir.to_path_buf()
        }
        None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    Ok(dir.join(target_name))
}
