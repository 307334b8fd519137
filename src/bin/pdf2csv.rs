//! CLI binary for pdf2csv.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, drives the `Session` controller, and writes the CSV.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2csv::{
    csv_filename, pipeline::input, render_page, source_name, to_csv, write_csv_file,
    ExtractionConfig, GeminiClient, JsonFileStore, Session, DEFAULT_USER_PROMPT,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract with the default column prompt, CSV written next to the input
  pdf2csv invoice.pdf

  # Say what you want in plain language
  pdf2csv invoice.pdf -p "invoice number, line items with quantities, total"

  # Explicit output file
  pdf2csv report.pdf -p "all dates and amounts" -o amounts.csv

  # Extract from a URL
  pdf2csv https://example.com/statement.pdf -p "transactions"

  # Print records as JSON instead of writing CSV
  pdf2csv invoice.pdf -p "totals" --json

  # Render a page preview to PNG (no API key needed)
  pdf2csv invoice.pdf --preview 1 --preview-out page1.png

  # Show / clear previously used prompts
  pdf2csv --history
  pdf2csv --clear-history

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      Google Gemini API key (required for extraction)
  PDFIUM_LIB_PATH     Path to an existing libpdfium shared library

SETUP:
  1. Set API key:     export GEMINI_API_KEY=...
  2. Extract:         pdf2csv document.pdf -p "what you want" -o out.csv
"#;

/// Extract tabular data from PDF files and URLs into CSV using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2csv",
    version,
    about = "Extract tabular data from PDF files and URLs into CSV using an LLM",
    long_about = "Extract structured records from PDF documents (local files or URLs) by \
describing the data you want in plain language. The PDF's text is sent to Google Gemini, \
which returns a JSON array of records that is serialized to CSV.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    ///
    /// Optional only for --history / --clear-history.
    input: Option<String>,

    /// What to extract, in plain language (column names work well).
    #[arg(short, long, env = "PDF2CSV_PROMPT", default_value = DEFAULT_USER_PROMPT)]
    prompt: String,

    /// Write CSV to this file. Default: <input basename>_data.csv.
    #[arg(short, long, env = "PDF2CSV_OUTPUT")]
    output: Option<PathBuf>,

    /// Gemini model ID.
    #[arg(long, env = "PDF2CSV_MODEL", default_value = "gemini-2.5-flash")]
    model: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2CSV_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "PDF2CSV_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// LLM call timeout in seconds.
    #[arg(long, env = "PDF2CSV_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "PDF2CSV_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print extracted records as pretty JSON to stdout instead of writing CSV.
    #[arg(long, env = "PDF2CSV_JSON")]
    json: bool,

    /// Render this page (1-indexed) to a PNG preview instead of extracting.
    #[arg(long, value_name = "PAGE")]
    preview: Option<usize>,

    /// Output path for the preview PNG. Default: <input basename>_page<N>.png.
    #[arg(long, value_name = "FILE")]
    preview_out: Option<PathBuf>,

    /// Target width in pixels for the preview render.
    #[arg(long, env = "PDF2CSV_PREVIEW_WIDTH", default_value_t = 800)]
    preview_width: u32,

    /// List previously used prompts, most recent first, and exit.
    #[arg(long)]
    history: bool,

    /// Delete the persisted prompt history and exit.
    #[arg(long)]
    clear_history: bool,

    /// Override the prompt history file location.
    #[arg(long, env = "PDF2CSV_HISTORY_FILE")]
    history_file: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "PDF2CSV_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters during extraction;
    // INFO-level library logs would fight it for the terminal.
    let show_spinner = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let history_store = match &cli.history_file {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location(),
    };
    let mut session = Session::new(history_store);

    // ── History modes (no input or API key needed) ───────────────────────
    if cli.history {
        let entries = session.history().entries();
        if entries.is_empty() {
            eprintln!("No prompt history.");
        } else {
            for (i, prompt) in entries.iter().enumerate() {
                println!("{:>2}. {}", i + 1, prompt);
            }
        }
        return Ok(());
    }

    if cli.clear_history {
        session.clear_history();
        if !cli.quiet {
            eprintln!("{} Prompt history cleared", green("✔"));
        }
        return Ok(());
    }

    let input_str = cli
        .input
        .as_deref()
        .context("An input PDF path or URL is required")?;

    let config = ExtractionConfig::builder()
        .model(&cli.model)
        .temperature(cli.temperature)
        .max_output_tokens(cli.max_tokens)
        .preview_width(cli.preview_width)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout)
        .build()
        .context("Invalid configuration")?;

    let name = source_name(input_str);
    let bytes = input::resolve_input(input_str, config.download_timeout_secs)
        .await
        .context("Failed to read input")?;

    // ── Preview mode (no API key needed) ─────────────────────────────────
    if let Some(page) = cli.preview {
        let out = cli.preview_out.clone().unwrap_or_else(|| {
            let stem = PathBuf::from(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "page".to_string());
            PathBuf::from(format!("{stem}_page{page}.png"))
        });

        let image = render_page(bytes, page, config.preview_width)
            .await
            .context("Failed to render preview")?;
        image
            .save(&out)
            .with_context(|| format!("Failed to write preview to {}", out.display()))?;

        if !cli.quiet {
            eprintln!(
                "{} Page {} → {} ({}x{} px)",
                green("✔"),
                page,
                bold(&out.display().to_string()),
                image.width(),
                image.height()
            );
        }
        return Ok(());
    }

    // ── Extraction ───────────────────────────────────────────────────────
    let client = GeminiClient::from_config(&config).context("Cannot start extraction")?;

    session
        .select_file(&name, bytes)
        .context("Failed to select file")?;
    session.set_prompt(cli.prompt.trim());

    let spinner = if show_spinner {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.set_message(name.clone());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let outcome = session
        .run_extraction(&client, &config)
        .await
        .map(|records| records.clone());

    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }

    let records = match outcome {
        Ok(records) => records,
        Err(_) => {
            let message = session
                .error_message()
                .unwrap_or("extraction failed")
                .to_string();
            eprintln!("{} {}", red("✘"), message);
            std::process::exit(1);
        }
    };

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
        return Ok(());
    }

    if records.is_empty() {
        if !cli.quiet {
            eprintln!("{} No matching data found — no CSV written", dim("∅"));
        }
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(csv_filename(&name)));

    write_csv_file(&records, &output_path)
        .await
        .context("Failed to write CSV")?;

    if !cli.quiet {
        eprintln!(
            "{} {} records  →  {}",
            green("✔"),
            bold(&records.len().to_string()),
            bold(&output_path.display().to_string()),
        );
        let csv = to_csv(&records);
        if let Some(header) = csv.lines().next() {
            eprintln!("   {}", dim(&format!("columns: {header}")));
        }
    }

    Ok(())
}
