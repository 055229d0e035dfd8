//! Error type for the edgequake-pdf-invert library.
//!
//! A conversion either produces the whole output document or nothing, so
//! there is a single fatal error type, [`InvertError`]. Its variants keep the
//! failure cause apart (missing file, wrong password, render failure, disk
//! write failure) instead of flattening everything into one message.
//!
//! [`InvertError::status_message`] renders the one-line text the CLI prints.

use crate::output::PageGeometry;
use std::path::PathBuf;
use thiserror::Error;

/// Prefix of every non-pre-flight failure line.
pub const FAILURE_PREFIX: &str = "Error inverting PDF colors";

/// All errors returned by the edgequake-pdf-invert library.
#[derive(Debug, Error)]
pub enum InvertError {
    // ── Pre-flight errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    /// Input file name does not end in `.pdf` (case-insensitive).
    #[error("Input file must be a PDF")]
    NotAPdf { path: PathBuf },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy."
    )]
    PdfiumBindingFailed(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not load the document.
    #[error("Failed to open PDF '{}': {detail}", .path.display())]
    OpenFailed { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{}' is encrypted and requires a password", .path.display())]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{}'", .path.display())]
    WrongPassword { path: PathBuf },

    /// A source page could not be fetched or rasterised (1-indexed).
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// An output page could not be created or the raster embedded in it.
    #[error("Failed to build output page {page}: {detail}")]
    PageCreateFailed { page: usize, detail: String },

    /// The assembled document does not have one page per source page.
    #[error("Output has {actual} pages, expected {expected}")]
    PageCountMismatch { expected: usize, actual: usize },

    /// An output page's size differs from its source page.
    #[error(
        "Output page {page} is {}x{} pt, expected {}x{} pt",
        .actual.width_pt, .actual.height_pt, .expected.width_pt, .expected.height_pt
    )]
    PageGeometryMismatch {
        page: usize,
        expected: PageGeometry,
        actual: PageGeometry,
    },

    /// pdfium could not serialise the output document.
    #[error("Failed to serialise output PDF: {detail}")]
    SerializeFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvertError {
    /// `true` for the checks that run before any PDF is opened.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            InvertError::InputNotFound { .. } | InvertError::NotAPdf { .. }
        )
    }

    /// One-line, human-readable failure description.
    ///
    /// Pre-flight failures are reported as-is; everything else is prefixed
    /// with [`FAILURE_PREFIX`].
    pub fn status_message(&self) -> String {
        if self.is_preflight() {
            self.to_string()
        } else {
            format!("{FAILURE_PREFIX}: {self}")
        }
    }
}
