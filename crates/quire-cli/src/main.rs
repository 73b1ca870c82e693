// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire: convert PDFs to text or HTML, and typeset text or tables into PDF.
//
// Entry point. Initialises logging, loads the engine configuration, and
// dispatches to one conversion per invocation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use quire_core::error::QuireError;
use quire_core::human_errors::humanize_error;
use quire_core::types::DocumentType;
use quire_core::EngineConfig;
use quire_document::input::{Sheet, detect_separator, parse_delimited, read_sheets};
use quire_document::{Converter, ProgressUpdate, TextRecognizer, UnavailableRecognizer};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Convert PDFs to editable text and typeset text or tables into PDF")]
#[command(version)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the text of a PDF, recognising scanned pages
    Extract {
        /// PDF to read
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory holding the OCR model files
        #[arg(long)]
        models: Option<PathBuf>,

        /// Recognition language
        #[arg(long)]
        lang: Option<String>,

        /// Omit the per-page markers from text output
        #[arg(long)]
        no_page_markers: bool,
    },

    /// Typeset a plain-text file into a PDF
    Typeset {
        /// Text file to read
        input: PathBuf,

        /// PDF to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Lay a spreadsheet or TSV/CSV file out as tables in a PDF
    Table {
        /// Workbook (.xlsx, .xls, .ods) or delimited text (.tsv, .csv)
        input: PathBuf,

        /// PDF to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the default engine configuration as JSON
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
}

impl OutputFormat {
    fn document_type(self) -> DocumentType {
        match self {
            Self::Text => DocumentType::PlainText,
            Self::Html => DocumentType::Html,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<QuireError>() {
                Some(quire_err) => eprintln!("{}", humanize_error(quire_err)),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            input,
            format,
            output,
            models,
            lang,
            no_page_markers,
        } => {
            if models.is_some() {
                config.ocr_model_dir = models;
            }
            if let Some(lang) = lang {
                config.language = lang;
            }
            if no_page_markers {
                config.page_markers = false;
            }
            cmd_extract(config, &input, format, output.as_deref())
        }
        Commands::Typeset { input, output } => cmd_typeset(config, &input, &output),
        Commands::Table { input, output } => cmd_table(config, &input, &output),
        Commands::Config => {
            let json = serde_json::to_string_pretty(&EngineConfig::default())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "Output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

// -- Extraction ---------------------------------------------------------------

fn cmd_extract(
    config: EngineConfig,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let pdf = read_input(input)?;
    let recognizer = load_recognizer(&config);
    let (tx, rx) = mpsc::channel::<ProgressUpdate>();

    let converted = std::thread::scope(|scope| {
        let reporter = scope.spawn(move || report_progress(rx));
        let result = Converter::new(config, &*recognizer)
            .with_progress(tx)
            .convert(&pdf, DocumentType::Pdf, format.document_type());
        // The converter, and with it the last sender, is gone; the reporter
        // drains what is left and returns.
        let _ = reporter.join();
        result
    });

    write_output(output, &converted?)
}

#[cfg(feature = "ocr")]
fn load_recognizer(config: &EngineConfig) -> Box<dyn TextRecognizer> {
    use quire_document::{OcrConfig, OcrsRecognizer};

    match OcrsRecognizer::new(&OcrConfig::for_engine(config)) {
        Ok(recognizer) => Box::new(recognizer),
        Err(err) => {
            warn!(%err, "OCR unavailable; scanned pages will fail");
            Box::new(UnavailableRecognizer)
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn load_recognizer(_config: &EngineConfig) -> Box<dyn TextRecognizer> {
    warn!("Built without OCR; scanned pages will fail");
    Box::new(UnavailableRecognizer)
}

/// Log each change of the overall percentage as a `tracing` event, so
/// progress and diagnostics share one ordered stream on stderr. Returns the
/// number of events logged.
fn report_progress(updates: mpsc::Receiver<ProgressUpdate>) -> usize {
    let mut last_percent = None;
    let mut logged = 0;
    for update in updates {
        if last_percent == Some(update.percent) {
            continue;
        }
        last_percent = Some(update.percent);
        info!(
            percent = update.percent,
            page = update.page_index + 1,
            pages = update.page_count,
            strategy = update.strategy.as_str(),
            "Progress"
        );
        logged += 1;
    }
    logged
}

// -- Generation ---------------------------------------------------------------

fn cmd_typeset(config: EngineConfig, input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {} as UTF-8 text", input.display()))?;
    let recognizer = UnavailableRecognizer;
    let pdf = Converter::new(config, &recognizer).typeset(&text)?;
    write_output(Some(output), &pdf)
}

fn cmd_table(config: EngineConfig, input: &Path, output: &Path) -> Result<()> {
    let kind = input
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentType::from_extension);
    let bytes = read_input(input)?;

    let sheets = match kind {
        Some(DocumentType::Spreadsheet) => read_sheets(&bytes)?,
        Some(DocumentType::Delimited) => {
            let text = std::str::from_utf8(&bytes)
                .with_context(|| format!("reading {} as UTF-8 text", input.display()))?;
            let rows = parse_delimited(text, detect_separator(text));
            let name = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            vec![Sheet::new(name, rows)]
        }
        _ => bail!(
            "{} is not a spreadsheet or delimited text file",
            input.display()
        ),
    };

    let recognizer = UnavailableRecognizer;
    let pdf = Converter::new(config, &recognizer).tabulate(&sheets)?;
    write_output(Some(output), &pdf)
}
