//! Input resolution: pre-flight checks and output-path derivation.
//!
//! Both checks run before pdfium is bound, so a typo in the path is reported
//! instantly and never leaves anything on disk.

use crate::config::OUTPUT_SUFFIX;
use crate::error::InvertError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The validated input and the output location the conversion will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Check if the path names a PDF: it ends in `.pdf`, in any letter case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".pdf")
}

/// Derive `<stem>_inverted<.ext>` next to `input`, keeping the extension as
/// written (`Scan.PDF` becomes `Scan_inverted.PDF`).
pub fn derive_output_path(input: &Path) -> PathBuf {
    let mut name: OsString = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(OUTPUT_SUFFIX);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Validate `input` and resolve the output path.
///
/// Checks, in order: the input exists, then its name ends in `.pdf`.
pub fn resolve_paths(input: &Path, output: Option<&Path>) -> Result<ResolvedPaths, InvertError> {
    if !input.exists() {
        return Err(InvertError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if !has_pdf_extension(input) {
        return Err(InvertError::NotAPdf {
            path: input.to_path_buf(),
        });
    }

    let resolved = ResolvedPaths {
        input: input.to_path_buf(),
        output: output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| derive_output_path(input)),
    };

    debug!(
        "Resolved {} → {}",
        resolved.input.display(),
        resolved.output.display()
    );
    Ok(resolved)
}
