//! Conversion entry points.
//!
//! [`invert_pdf`] is the primary API: it validates the paths, walks the source
//! document page by page and writes the inverted copy in one atomic step.
//! [`invert_pdf_bytes`] runs the same loop on an in-memory PDF, and
//! [`invert_pdf_async`] moves [`invert_pdf`] onto tokio's blocking pool for
//! async callers.
//!
//! Pages are processed strictly in order on one thread. The output is only
//! serialised after the last page succeeded, so a failing page discards the
//! whole output rather than leaving a truncated file.

use crate::config::InversionConfig;
use crate::error::InvertError;
use crate::output::{InversionReport, PageReport};
use crate::pipeline::{assemble, input, invert, render};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Invert the colors of every page of the PDF at `input_path`.
///
/// When `output_path` is `None` the result is written to
/// `<input_stem>_inverted<.ext>` next to the input, overwriting any previous
/// result there.
///
/// # Errors
/// - [`InvertError::InputNotFound`] / [`InvertError::NotAPdf`] — pre-flight,
///   nothing is opened or written.
/// - Any other variant — the conversion failed and no output was written.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf_invert::{invert_pdf, InversionConfig};
///
/// let report = invert_pdf("paper.pdf", None::<&str>, &InversionConfig::default())?;
/// println!("{}", report.status_message());
/// # Ok::<(), edgequake_pdf_invert::InvertError>(())
/// ```
pub fn invert_pdf(
    input_path: impl AsRef<Path>,
    output_path: Option<impl AsRef<Path>>,
    config: &InversionConfig,
) -> Result<InversionReport, InvertError> {
    let started = Instant::now();
    let output_path: Option<&Path> = output_path.as_ref().map(|p| p.as_ref());
    let paths = input::resolve_paths(input_path.as_ref(), output_path)?;
    info!(
        "Inverting {} → {}",
        paths.input.display(),
        paths.output.display()
    );

    let pdfium = render::bind_pdfium(config.pdfium_library.as_deref())?;

    // The source document is dropped before the output is written, so an
    // output path equal to the input path is safe.
    let (bytes, pages) = {
        let source = render::open_document(&pdfium, &paths.input, config.password.as_deref())?;
        invert_document(&pdfium, &source, config)?
    };

    assemble::write_atomically(&bytes, &paths.output)?;

    let report = InversionReport {
        input_path: paths.input,
        output_path: paths.output,
        pages,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        "Inversion complete: {} pages, {}ms → {}",
        report.page_count(),
        report.duration_ms,
        report.output_path.display()
    );
    Ok(report)
}

/// Invert the colors of a PDF held in memory and return the output bytes.
///
/// No path checks apply; the bytes only have to be a PDF pdfium can open.
pub fn invert_pdf_bytes(
    bytes: &[u8],
    config: &InversionConfig,
) -> Result<(Vec<u8>, Vec<PageReport>), InvertError> {
    let pdfium = render::bind_pdfium(config.pdfium_library.as_deref())?;
    let source = render::open_document_from_bytes(&pdfium, bytes, config.password.as_deref())?;
    invert_document(&pdfium, &source, config)
}

/// Async wrapper around [`invert_pdf`].
///
/// pdfium is blocking and CPU-bound, so the whole conversion runs inside
/// `tokio::task::spawn_blocking`; pages are still processed sequentially.
pub async fn invert_pdf_async(
    input_path: impl AsRef<Path>,
    output_path: Option<impl AsRef<Path>>,
    config: &InversionConfig,
) -> Result<InversionReport, InvertError> {
    let input: PathBuf = input_path.as_ref().to_path_buf();
    let output: Option<PathBuf> = output_path.map(|p| p.as_ref().to_path_buf());
    let config = config.clone();

    tokio::task::spawn_blocking(move || invert_pdf(&input, output.as_deref(), &config))
        .await
        .map_err(|e| InvertError::Internal(format!("Inversion task panicked: {}", e)))?
}

/// The per-page loop shared by the file and in-memory entry points.
///
/// Returns the serialised output document and one report per page.
fn invert_document(
    pdfium: &Pdfium,
    source: &PdfDocument,
    config: &InversionConfig,
) -> Result<(Vec<u8>, Vec<PageReport>), InvertError> {
    let total = source.pages().len() as usize;
    let callback = config.progress_callback.as_ref();
    if let Some(cb) = callback {
        cb.on_conversion_start(total);
    }

    let mut output = pdfium
        .create_new_pdf()
        .map_err(|e| InvertError::Internal(format!("Failed to create output PDF: {:?}", e)))?;

    let mut pages = Vec::with_capacity(total);
    for (idx, page) in source.pages().iter().enumerate() {
        let page_num = idx + 1;
        if let Some(cb) = callback {
            cb.on_page_start(page_num, total);
        }

        match invert_page(&mut output, &page, page_num, config.scale) {
            Ok(report) => {
                if let Some(cb) = callback {
                    cb.on_page_complete(
                        page_num,
                        total,
                        report.raster_width,
                        report.raster_height,
                    );
                }
                pages.push(report);
            }
            Err(e) => {
                warn!("Page {}/{} failed: {}", page_num, total, e);
                if let Some(cb) = callback {
                    cb.on_page_error(page_num, total, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    assemble::verify_output(&output, &pages)?;
    let bytes = assemble::serialize(&output)?;
    debug!("Serialised output: {} pages, {} bytes", total, bytes.len());

    if let Some(cb) = callback {
        cb.on_conversion_complete(total);
    }
    Ok((bytes, pages))
}

/// Render, invert and embed a single page.
fn invert_page(
    output: &mut PdfDocument,
    page: &PdfPage,
    page_num: usize,
    scale: f32,
) -> Result<PageReport, InvertError> {
    let geometry = render::page_geometry(page);
    let mut raster = render::render_page(page, page_num, geometry, scale)?;
    invert::invert_raster(&mut raster);
    assemble::append_raster_page(output, page_num, geometry, &raster)?;

    Ok(PageReport {
        page_num,
        geometry,
        raster_width: raster.width(),
        raster_height: raster.height(),
    })
}
