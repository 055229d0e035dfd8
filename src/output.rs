//! Result types returned by a successful inversion.

use std::path::PathBuf;

/// Width and height of a PDF page in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageGeometry {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    /// Pixel size of a raster rendered at `scale`, at least 1x1.
    pub fn raster_size(&self, scale: f32) -> (u32, u32) {
        let px = |pt: f32| (pt * scale).round().max(1.0) as u32;
        (px(self.width_pt), px(self.height_pt))
    }

    /// Same size as `other` to within a hundredth of a point.
    pub fn matches(&self, other: &PageGeometry) -> bool {
        const TOLERANCE_PT: f32 = 0.01;
        (self.width_pt - other.width_pt).abs() <= TOLERANCE_PT
            && (self.height_pt - other.height_pt).abs() <= TOLERANCE_PT
    }
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// 1-indexed page number, identical in source and output.
    pub page_num: usize,
    /// Geometry shared by the source page and its output page.
    pub geometry: PageGeometry,
    /// Width of the embedded raster in pixels.
    pub raster_width: u32,
    /// Height of the embedded raster in pixels.
    pub raster_height: u32,
}

/// Summary of a completed file-to-file inversion.
#[derive(Debug, Clone)]
pub struct InversionReport {
    pub input_path: PathBuf,
    /// Where the output was written (explicit or derived).
    pub output_path: PathBuf,
    /// One entry per page, in document order.
    pub pages: Vec<PageReport>,
    /// Wall-clock time of the whole conversion.
    pub duration_ms: u64,
}

impl InversionReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// One-line success description, e.g.
    /// `Successfully inverted PDF colors: report_inverted.pdf`.
    pub fn status_message(&self) -> String {
        format!(
            "Successfully inverted PDF colors: {}",
            self.output_path.display()
        )
    }
}
