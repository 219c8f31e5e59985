//! CLI commands implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tokio::sync::mpsc;

use docsift::analysis::search;
use docsift::config::{ExtractionConfig, Settings};
use docsift::export::{self, ExportKind};
use docsift::models::{DocumentResult, RawDocument};
use docsift::ocr::{check_tools, DocumentExtractor, OcrBackend, TesseractBackend};
use docsift::repository::HistoryRepository;
use docsift::services::{ExtractionEvent, ExtractionOutcome, ExtractionService};
use docsift::utils::{format_duration, format_size};

use super::progress::PageProgress;

#[derive(Parser)]
#[command(name = "docsift")]
#[command(about = "Text and table extraction from PDFs and scanned images")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to docsift.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and tables from a PDF or image
    Extract {
        /// Document to process
        file: PathBuf,
        /// OCR languages joined with '+' (e.g. eng+ara)
        #[arg(short, long)]
        lang: Option<String>,
        /// Use embedded PDF text only
        #[arg(long)]
        no_ocr: bool,
        /// Skip table detection
        #[arg(long)]
        no_tables: bool,
        /// Output rendering
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Write files to this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a document and search its text
    Search {
        /// Document to process
        file: PathBuf,
        /// Case-insensitive search term
        term: String,
        /// OCR languages joined with '+'
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// List recently processed documents
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show processing statistics
    Stats,

    /// Check if required OCR tools are installed
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
    /// Per-page character and word counts as CSV
    Summary,
    /// Detected tables as CSV
    Tables,
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Extract {
            file,
            lang,
            no_ocr,
            no_tables,
            format,
            output,
        } => {
            let mut config = settings.extraction.clone();
            apply_overrides(&mut config, lang, no_ocr, no_tables)?;
            cmd_extract(&settings, &file, config, format, output.as_deref()).await
        }
        Commands::Search { file, term, lang } => {
            let mut config = settings.extraction.clone();
            apply_overrides(&mut config, lang, false, false)?;
            cmd_search(&settings, &file, config, &term).await
        }
        Commands::History { limit } => cmd_history(&settings, limit),
        Commands::Stats => cmd_stats(&settings),
        Commands::Check => cmd_check(),
    }
}

fn apply_overrides(
    config: &mut ExtractionConfig,
    lang: Option<String>,
    no_ocr: bool,
    no_tables: bool,
) -> anyhow::Result<()> {
    if let Some(lang) = lang {
        config.language = lang;
    }
    if no_ocr {
        config.ocr_enabled = false;
    }
    if no_tables {
        config.tables_enabled = false;
    }
    config.validate()?;
    Ok(())
}

fn open_history(settings: &Settings) -> anyhow::Result<HistoryRepository> {
    let db_path = settings.database_path();
    HistoryRepository::new(&db_path)
        .with_context(|| format!("Failed to open history database {}", db_path.display()))
}

/// Load, extract and record a document with a progress bar on stderr.
async fn run_extraction(
    settings: &Settings,
    file: &Path,
    config: ExtractionConfig,
) -> anyhow::Result<(RawDocument, ExtractionOutcome)> {
    let document =
        RawDocument::load(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let extractor = DocumentExtractor::with_defaults(settings.ocr_config());
    if !extractor.ocr_backend().is_available() {
        eprintln!(
            "{} {}",
            style("Warning:").yellow(),
            extractor.ocr_backend().availability_hint()
        );
    }

    let service = ExtractionService::new(Arc::new(extractor))
        .with_history(Arc::new(open_history(settings)?))
        .with_timeout(settings.timeout_secs.map(Duration::from_secs));

    let progress = PageProgress::new(document.filename());
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let listener = {
        let progress = progress.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                match event {
                    ExtractionEvent::PreviouslySeen(record) => progress.println(format!(
                        "{} same content processed as {} on {}",
                        style("Seen before:").cyan(),
                        record.filename,
                        record.upload_time.format("%Y-%m-%d %H:%M")
                    )),
                    ExtractionEvent::PageCompleted { completed, total } => {
                        progress.page_done(completed, total)
                    }
                }
            }
        })
    };

    let result = service.process(document.clone(), config, Some(event_tx)).await;
    match &result {
        Ok(_) => {
            let _ = listener.await;
        }
        Err(_) => listener.abort(),
    }
    progress.finish();

    let outcome = result.with_context(|| format!("Failed to extract {}", file.display()))?;
    if let Some(e) = &outcome.history_error {
        eprintln!("{} history not updated: {}", style("Warning:").yellow(), e);
    }
    Ok((document, outcome))
}

async fn cmd_extract(
    settings: &Settings,
    file: &Path,
    config: ExtractionConfig,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (document, outcome) = run_extraction(settings, file, config).await?;
    let result = &outcome.result;

    let rendered: Vec<(ExportKind, String)> = match format {
        OutputFormat::Text => vec![(ExportKind::Text, export::to_text(result))],
        OutputFormat::Markdown => vec![(
            ExportKind::Markdown,
            export::to_markdown(result, document.filename()),
        )],
        OutputFormat::Json => vec![(ExportKind::Json, export::to_json(result)?)],
        OutputFormat::Summary => vec![(ExportKind::PageSummary, export::page_summary_csv(result)?)],
        OutputFormat::Tables => result
            .tables
            .iter()
            .enumerate()
            .map(|(i, table)| -> anyhow::Result<(ExportKind, String)> {
                Ok((ExportKind::Table(i + 1), export::table_csv(table)?))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for (kind, body) in &rendered {
                let path = output_path(dir, &document, *kind);
                std::fs::write(&path, body)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("{} {}", style("Wrote").green(), path.display());
            }
        }
        None => {
            for (_, body) in &rendered {
                println!("{}", body);
            }
        }
    }

    print_summary(document.filename(), &outcome);
    Ok(())
}

/// Export destination, named after the full source file name.
fn output_path(dir: &Path, document: &RawDocument, kind: ExportKind) -> PathBuf {
    dir.join(export::export_filename(document.filename(), kind))
}

fn print_summary(filename: &str, outcome: &ExtractionOutcome) {
    let result: &DocumentResult = &outcome.result;
    eprintln!(
        "{} {}: {} pages ({} OCR), {} characters, {} words, {} tables in {}",
        style("Done").green().bold(),
        filename,
        result.page_count,
        result.ocr_page_count(),
        result.character_count(),
        result.word_count(),
        result.tables.len(),
        format_duration(outcome.duration)
    );
}

async fn cmd_search(
    settings: &Settings,
    file: &Path,
    config: ExtractionConfig,
    term: &str,
) -> anyhow::Result<()> {
    let (_, outcome) = run_extraction(settings, file, config).await?;
    let matches = search(&outcome.result.pages, term);

    if matches.is_empty() {
        println!("No matches for '{}'", term);
        return Ok(());
    }

    println!(
        "{} match(es) for '{}':\n",
        style(matches.len()).bold(),
        term
    );
    for m in &matches {
        println!(
            "  {} {}",
            style(format!("p{}:{}", m.page_number, m.line_number)).cyan(),
            m.preview
        );
    }
    Ok(())
}

fn cmd_history(settings: &Settings, limit: usize) -> anyhow::Result<()> {
    let records = open_history(settings)?.recent(limit)?;

    if records.is_empty() {
        println!("No documents processed yet");
        return Ok(());
    }

    println!(
        "{:<17} {:<10} {:<32} {:>6} {:>10} {:>8}",
        "Processed", "Hash", "File", "Pages", "Size", "Status"
    );
    println!("{}", "-".repeat(88));
    for record in &records {
        let status = if record.success {
            style("ok").green()
        } else {
            style("failed").red()
        };
        println!(
            "{:<17} {:<10} {:<32} {:>6} {:>10} {:>8}",
            record.upload_time.format("%Y-%m-%d %H:%M"),
            record.fingerprint.short(),
            truncate(&record.filename, 32),
            record.page_count,
            format_size(record.byte_size),
            status
        );
    }
    Ok(())
}

fn cmd_stats(settings: &Settings) -> anyhow::Result<()> {
    let stats = open_history(settings)?.stats()?;

    println!("\n{}", style("Processing Statistics").bold());
    println!("{}", "-".repeat(40));
    println!("  {:<25} {}", "Documents processed:", stats.total_successful_count);
    println!("  {:<25} {}", "Characters extracted:", stats.total_character_count);
    println!("  {:<25} {}", "Database:", settings.database_path().display());
    Ok(())
}

fn cmd_check() -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (tool, available) in check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    let tesseract = TesseractBackend::new();
    if !tesseract.is_available() {
        println!("\n  {}", style(tesseract.availability_hint()).dim());
    }

    if all_found {
        println!("\n{}", style("All tools available").green());
    } else {
        println!(
            "\n{}",
            style("Some tools are missing; PDF pages or OCR may fail").yellow()
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
