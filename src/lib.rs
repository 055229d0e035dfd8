//! # edgequake-pdf-invert
//!
//! Produce a color-inverted copy of a PDF: every page is rasterised, each
//! pixel's color is flipped (`v → max − v`), and the result is embedded as a
//! full-page image on a page of the same size in a new PDF. Dark-on-light
//! documents become light-on-dark, which makes them comfortable to read at
//! night or on e-ink devices with a dark theme.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     check the file exists and ends in .pdf, derive the output path
//!  ├─ 2. Render    rasterise each page at 2x via pdfium
//!  ├─ 3. Invert    flip every color channel (alpha kept)
//!  ├─ 4. Assemble  same-size page, image stretched over it
//!  └─ 5. Save      serialise once, write atomically
//! ```
//!
//! Pages are handled one after another and only one raster is alive at a
//! time. The output is written only after every page succeeded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_invert::{invert_pdf, InversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InversionConfig::default();
//!     // Writes slides_inverted.pdf next to the input.
//!     let report = invert_pdf("slides.pdf", None::<&str>, &config)?;
//!     println!("{} ({} pages)", report.status_message(), report.page_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `pdfinvert` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `bundled` | off     | Embeds the pdfium library named by `PDFIUM_BUNDLE_LIB` at build time |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf-invert = { version = "0.1", default-features = false }
//! ```
//!
//! ## Output characteristics
//!
//! Each output page holds a single raster image. Text in the output is not
//! selectable or searchable, even when it was in the input.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InversionConfig, InversionConfigBuilder, ProgressCallback, DEFAULT_SCALE};
pub use convert::{invert_pdf, invert_pdf_async, invert_pdf_bytes};
pub use error::InvertError;
pub use output::{InversionReport, PageGeometry, PageReport};
pub use pipeline::input::derive_output_path;
pub use pipeline::render::bind_pdfium;
pub use progress::{InversionProgressCallback, NoopProgressCallback};
