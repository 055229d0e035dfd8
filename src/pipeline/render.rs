//! PDF access through pdfium: bind the library, open documents, rasterise
//! one page at a time.
//!
//! ## Why one page at a time?
//!
//! A rendered page only lives until it has been inverted and embedded in the
//! output document. Rendering lazily inside the conversion loop keeps peak
//! memory at one raster, whatever the page count.
//!
//! ## Why size by scale, not DPI?
//!
//! The raster is sized from the page's own geometry (`points × scale`), so
//! the embedded image density is the same on every page no matter how mixed
//! the paper sizes are.

use crate::error::InvertError;
use crate::output::PageGeometry;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bind to a pdfium shared library.
///
/// Resolution order: `library` if given, then whatever `pdfium-auto` finds
/// without network access (`PDFIUM_LIB_PATH`, its cache), then a library in
/// the working directory, then the system library.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, InvertError> {
    let located = library
        .map(Path::to_path_buf)
        .or_else(|| pdfium_auto::locate_pdfium_library().map(|l| l.path().to_path_buf()));

    if let Some(path) = located {
        debug!("Binding pdfium from {}", path.display());
        return pdfium_auto::bind_pdfium_from_path(&path)
            .map_err(|e| InvertError::PdfiumBindingFailed(e.to_string()));
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| InvertError::PdfiumBindingFailed(format!("{:?}", e)))?;
    debug!("Bound pdfium from working directory or system library");
    Ok(Pdfium::new(bindings))
}

/// Open a PDF file.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, InvertError> {
    let document = pdfium
        .load_pdf_from_file(path, password)
        .map_err(|e| map_open_error(e, path, password.is_some()))?;
    info!("PDF loaded: {} pages", document.pages().len());
    Ok(document)
}

/// Open a PDF held in memory.
pub fn open_document_from_bytes<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
    password: Option<&str>,
) -> Result<PdfDocument<'a>, InvertError> {
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| map_open_error(e, Path::new("<memory>"), password.is_some()))?;
    info!(
        "PDF loaded from {} bytes: {} pages",
        bytes.len(),
        document.pages().len()
    );
    Ok(document)
}

/// Classify a pdfium load failure.
fn map_open_error(e: PdfiumError, path: &Path, password_given: bool) -> InvertError {
    let err_str = format!("{:?}", e);
    let path: PathBuf = path.to_path_buf();
    if err_str.contains("Password") || err_str.contains("password") {
        if password_given {
            InvertError::WrongPassword { path }
        } else {
            InvertError::PasswordRequired { path }
        }
    } else {
        InvertError::OpenFailed {
            path,
            detail: err_str,
        }
    }
}

/// Width and height of `page` in points.
pub fn page_geometry(page: &PdfPage) -> PageGeometry {
    PageGeometry::new(page.width().value, page.height().value)
}

/// Rasterise one page at `scale` times its size in points.
///
/// `page_num` is 1-indexed and only used for error reporting.
pub fn render_page(
    page: &PdfPage,
    page_num: usize,
    geometry: PageGeometry,
    scale: f32,
) -> Result<DynamicImage, InvertError> {
    let (width, height) = geometry.raster_size(scale);
    let render_config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_maximum_height(height as i32);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| InvertError::RenderFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} ({:.1}x{:.1} pt) → {}x{} px",
        page_num,
        geometry.width_pt,
        geometry.height_pt,
        image.width(),
        image.height()
    );
    Ok(image)
}
