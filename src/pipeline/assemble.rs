//! Output assembly: one raster-only page per source page, then an atomic
//! write of the finished document.

use crate::error::InvertError;
use crate::output::{PageGeometry, PageReport};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append a page of size `geometry` to `document`, covered edge to edge by
/// `raster`.
///
/// `page_num` is 1-indexed and only used for error reporting.
pub fn append_raster_page(
    document: &mut PdfDocument,
    page_num: usize,
    geometry: PageGeometry,
    raster: &DynamicImage,
) -> Result<(), InvertError> {
    let create_err = |e: PdfiumError| InvertError::PageCreateFailed {
        page: page_num,
        detail: format!("{:?}", e),
    };

    // A fresh image object is 1x1 pt at the origin; scaling it by the page
    // size stretches it over the whole page.
    let mut image_object = PdfPageImageObject::new(document, raster).map_err(create_err)?;
    image_object
        .scale(geometry.width_pt, geometry.height_pt)
        .map_err(create_err)?;

    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::Custom(
            PdfPoints::new(geometry.width_pt),
            PdfPoints::new(geometry.height_pt),
        ))
        .map_err(create_err)?;

    page.objects_mut()
        .add_image_object(image_object)
        .map_err(create_err)?;

    debug!(
        "Appended output page {} ({:.1}x{:.1} pt)",
        page_num, geometry.width_pt, geometry.height_pt
    );
    Ok(())
}

/// Check that the output holds one page per entry of `pages`, each with the
/// geometry recorded for its source page.
pub fn verify_output(document: &PdfDocument, pages: &[PageReport]) -> Result<(), InvertError> {
    let expected = pages.len();
    let actual = document.pages().len() as usize;
    if actual != expected {
        return Err(InvertError::PageCountMismatch { expected, actual });
    }

    for (page, report) in document.pages().iter().zip(pages) {
        let actual = PageGeometry::new(page.width().value, page.height().value);
        if !actual.matches(&report.geometry) {
            return Err(InvertError::PageGeometryMismatch {
                page: report.page_num,
                expected: report.geometry,
                actual,
            });
        }
    }
    Ok(())
}

/// Serialise the finished document.
pub fn serialize(document: &PdfDocument) -> Result<Vec<u8>, InvertError> {
    document
        .save_to_bytes()
        .map_err(|e| InvertError::SerializeFailed {
            detail: format!("{:?}", e),
        })
}

/// Write `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`: readers see either the old file or the complete
/// new one, and a failure leaves no partial output behind. Missing parent
/// directories are created.
pub fn write_atomically(bytes: &[u8], path: &Path) -> Result<(), InvertError> {
    let write_err = |source: std::io::Error| InvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".pdfinvert-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    // Temp files are created owner-only; the output is a regular document.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
