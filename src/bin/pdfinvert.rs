//! CLI binary for edgequake-pdf-invert.
//!
//! A thin shim over the library crate: maps CLI flags to `InversionConfig`,
//! makes sure a pdfium library is available, runs one conversion and prints
//! a single colored result line on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf_invert::config::{MAX_SCALE, MIN_SCALE};
use edgequake_pdf_invert::error::FAILURE_PREFIX;
use edgequake_pdf_invert::pipeline::input::{resolve_paths, ResolvedPaths};
use edgequake_pdf_invert::{
    invert_pdf, InversionConfig, InversionProgressCallback, InversionReport, InvertError,
    ProgressCallback, DEFAULT_SCALE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[92m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[91m{s}\x1b[0m")
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar on stderr, one tick per inverted page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Starts as a spinner; `on_conversion_start` turns it into a bar once the
    /// page count is known.
    fn new() -> Arc<Self> {
        Arc::new(Self::with_bar(ProgressBar::new(0)))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(SPINNER_TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

// Failures before the first page (binding, opening, writing) never reach
// `on_page_error`; clear the spinner before the result line is printed.
impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl InversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER_TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Inverting");
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page: usize, _total: usize, _w: u32, _h: u32) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, _page: usize, _total: usize, _error: &str) {
        // The error itself is reported on the result line.
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Write report_inverted.pdf next to the input
  pdfinvert report.pdf

  # Choose the output file
  pdfinvert report.pdf --output-path night/report.pdf

  # Sharper output for small print (3x instead of 2x)
  pdfinvert --scale 3 datasheet.pdf

  # Encrypted input
  pdfinvert --password s3cret statement.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter (e.g. debug, edgequake_pdf_invert=trace)

NOTES:
  Every output page is a single image, so text in the output is not
  selectable or searchable. PDFium (~30 MB) is downloaded on first run and
  cached in ~/.cache/pdfinvert/pdfium-7690/.
"#;

/// Invert the colors of every page of a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "pdfinvert",
    version,
    about = "Invert the colors of every page of a PDF",
    long_about = "Render each page of a PDF, invert every pixel's color (black becomes white, \
white becomes black) and write the pages to a new PDF of identical page sizes.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input PDF file.
    input: PathBuf,

    /// Path for the output PDF file (default: <input>_inverted.pdf).
    #[arg(short, long, alias = "output_path")]
    output_path: Option<PathBuf>,

    /// Rasterisation scale relative to the page size in points (0.25–8).
    #[arg(long, default_value_t = DEFAULT_SCALE, value_parser = parse_scale)]
    scale: f32,

    /// PDF user password for encrypted documents.
    #[arg(long)]
    password: Option<String>,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress everything except the result line.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_scale(s: &str) -> std::result::Result<f32, String> {
    let v: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !(MIN_SCALE..=MAX_SCALE).contains(&v) {
        return Err(format!(
            "scale must be between {MIN_SCALE} and {MAX_SCALE} (got {v})"
        ));
    }
    Ok(v)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the feedback; INFO logs would tear it.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    match run(&cli, show_progress) {
        Ok(report) => {
            println!("{}", green(&report.status_message()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", red(&failure_line(&e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, show_progress: bool) -> Result<InversionReport> {
    // Pre-flight first: a wrong path must not trigger a pdfium download.
    let paths: ResolvedPaths = resolve_paths(&cli.input, cli.output_path.as_deref())?;

    let pdfium_library = provision_pdfium(cli)?;

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let mut builder = InversionConfig::builder()
        .scale(cli.scale)
        .pdfium_library(pdfium_library);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build()?;

    Ok(invert_pdf(&paths.input, Some(&paths.output), &config)?)
}

/// Make sure a pdfium library is on disk and return its path.
///
/// With `--features bundled` the library embedded at compile time is
/// extracted; otherwise `PDFIUM_LIB_PATH` or the cache is used, downloading
/// pdfium (~30 MB) once when neither has it.
fn provision_pdfium(cli: &Cli) -> Result<PathBuf> {
    #[cfg(feature = "bundled")]
    {
        let _ = cli;
        let location = pdfium_auto::ensure_pdfium_bundled()
            .context("Failed to extract bundled PDFium engine")?;
        Ok(location.path().to_path_buf())
    }

    #[cfg(not(feature = "bundled"))]
    {
        if pdfium_auto::is_pdfium_cached() || cli.quiet {
            let location = pdfium_auto::ensure_pdfium_library(None)
                .context("Failed to download PDFium engine")?;
            return Ok(location.path().to_path_buf());
        }

        let dl_bar = ProgressBar::new(0);
        dl_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(SPINNER_TICKS),
        );
        dl_bar.set_prefix("PDF engine");
        dl_bar.enable_steady_tick(Duration::from_millis(80));

        let bar = dl_bar.clone();
        let location = pdfium_auto::ensure_pdfium_library(Some(&|downloaded: u64, total: Option<u64>| {
            if let Some(t) = total {
                if bar.length() != Some(t) {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }));
        dl_bar.finish_and_clear();

        let location = location.context("Failed to download PDFium engine")?;
        Ok(location.path().to_path_buf())
    }
}

/// The text of the red result line.
fn failure_line(e: &anyhow::Error) -> String {
    match e.downcast_ref::<InvertError>() {
        Some(err) => err.status_message(),
        None => format!("{FAILURE_PREFIX}: {e:#}"),
    }
}
