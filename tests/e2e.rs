//! End-to-end tests for edgequake-pdf-invert.
//!
//! Fixture PDFs are generated on the fly with pdfium, so no test files are
//! needed. Tests that touch pdfium print SKIP and return when no pdfium
//! library can be bound (set `PDFIUM_LIB_PATH` or run the CLI once to fill
//! the cache).
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use edgequake_pdf_invert::pipeline::assemble;
use edgequake_pdf_invert::{
    bind_pdfium, invert_pdf, invert_pdf_async, invert_pdf_bytes, InversionConfig,
    InversionProgressCallback, InvertError, PageGeometry, PageReport,
};
use image::{DynamicImage, Rgb, RgbImage};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// pdfium is initialised and torn down per binding; keep bindings from
/// overlapping across test threads.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

fn pdfium_lock() -> MutexGuard<'static, ()> {
    PDFIUM_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Skip this test if no pdfium library can be bound.
macro_rules! skip_unless_pdfium {
    () => {{
        let guard = pdfium_lock();
        if let Err(e) = bind_pdfium(None) {
            println!("SKIP — pdfium not available: {e}");
            return;
        }
        guard
    }};
}

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);
const TINT: Rgb<u8> = Rgb([200, 40, 90]);

/// Left half `left`, right half `right`.
fn split_image(left: Rgb<u8>, right: Rgb<u8>) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, _| {
        if x < 100 {
            left
        } else {
            right
        }
    }))
}

/// Write a PDF with one page per entry of `pages` (width, height in points),
/// each covered by `image`.
fn write_fixture(path: &Path, pages: &[(f32, f32)], image: &DynamicImage) {
    let pdfium = bind_pdfium(None).unwrap();
    let mut document = pdfium.create_new_pdf().unwrap();
    for &(w, h) in pages {
        let mut object = PdfPageImageObject::new(&document, image).unwrap();
        object.scale(w, h).unwrap();
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(PdfPoints::new(w), PdfPoints::new(h)))
            .unwrap();
        page.objects_mut().add_image_object(object).unwrap();
    }
    document.save_to_file(path).unwrap();
}

/// Page sizes of the PDF at `path`, in order.
fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let pdfium = bind_pdfium(None).unwrap();
    let document = pdfium.load_pdf_from_file(path, None).unwrap();
    document
        .pages()
        .iter()
        .map(|p| (p.width().value, p.height().value))
        .collect()
}

/// Colors at the middle of the left and right halves of page 1.
fn sample_halves(path: &Path) -> (Rgb<u8>, Rgb<u8>) {
    let pdfium = bind_pdfium(None).unwrap();
    let document = pdfium.load_pdf_from_file(path, None).unwrap();
    let page = document.pages().get(0).unwrap();
    let raster = page
        .render_with_config(&PdfRenderConfig::new().set_target_width(200))
        .unwrap()
        .as_image()
        .to_rgb8();
    let (w, h) = raster.dimensions();
    (
        *raster.get_pixel(w / 4, h / 2),
        *raster.get_pixel(3 * w / 4, h / 2),
    )
}

fn assert_close(actual: Rgb<u8>, expected: Rgb<u8>, context: &str) {
    for c in 0..3 {
        let diff = (actual[c] as i16 - expected[c] as i16).abs();
        assert!(
            diff <= 4,
            "[{context}] channel {c}: got {:?}, expected {:?}",
            actual,
            expected
        );
    }
}

fn assert_size(actual: (f32, f32), expected: (f32, f32)) {
    assert!(
        (actual.0 - expected.0).abs() < 0.5 && (actual.1 - expected.1).abs() < 0.5,
        "page size {:?} != {:?}",
        actual,
        expected
    );
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl InversionProgressCallback for RecordingCallback {
    fn on_conversion_start(&self, total: usize) {
        self.push(format!("start {total}"));
    }
    fn on_page_start(&self, page: usize, total: usize) {
        self.push(format!("page {page}/{total}"));
    }
    fn on_page_complete(&self, page: usize, total: usize, w: u32, h: u32) {
        self.push(format!("done {page}/{total} {w}x{h}"));
    }
    fn on_page_error(&self, page: usize, _total: usize, _error: &str) {
        self.push(format!("error {page}"));
    }
    fn on_conversion_complete(&self, total: usize) {
        self.push(format!("complete {total}"));
    }
}

// ── Pre-flight (no pdfium needed) ────────────────────────────────────────────

#[test]
fn missing_input_is_reported_and_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nope.pdf");
    let output = dir.path().join("out.pdf");

    let err = invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap_err();

    assert!(matches!(err, InvertError::InputNotFound { .. }));
    assert_eq!(
        err.status_message(),
        format!("Input file not found: {}", input.display())
    );
    assert!(!output.exists());
}

#[test]
fn non_pdf_input_is_rejected_and_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"hello").unwrap();

    let err = invert_pdf(&input, None::<&Path>, &InversionConfig::default()).unwrap_err();

    assert!(matches!(err, InvertError::NotAPdf { .. }));
    assert_eq!(err.status_message(), "Input file must be a PDF");
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("notes.txt")]);
}

#[test]
fn existence_is_checked_before_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.txt");

    let err = invert_pdf(&input, None::<&Path>, &InversionConfig::default()).unwrap_err();

    assert!(matches!(err, InvertError::InputNotFound { .. }));
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn single_page_keeps_geometry_and_flips_colors() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.pdf");
    let output = dir.path().join("letter_out.pdf");
    write_fixture(&input, &[(612.0, 792.0)], &split_image(DARK, LIGHT));

    let report = invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap();

    assert_eq!(report.page_count(), 1);
    assert_eq!(report.output_path, output);
    assert_eq!(
        report.status_message(),
        format!("Successfully inverted PDF colors: {}", output.display())
    );
    let page = &report.pages[0];
    assert_eq!((page.raster_width, page.raster_height), (1224, 1584));

    let sizes = page_sizes(&output);
    assert_eq!(sizes.len(), 1);
    assert_size(sizes[0], (612.0, 792.0));

    let (left, right) = sample_halves(&output);
    assert_close(left, LIGHT, "black half");
    assert_close(right, DARK, "white half");
}

#[test]
fn pages_keep_their_order_and_sizes() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed.pdf");
    let output = dir.path().join("mixed_out.pdf");
    let sizes = [(612.0, 792.0), (842.0, 595.0), (300.0, 300.0)];
    write_fixture(&input, &sizes, &split_image(DARK, LIGHT));

    let report = invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap();

    let numbers: Vec<usize> = report.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    let out_sizes = page_sizes(&output);
    assert_eq!(out_sizes.len(), sizes.len());
    for (actual, expected) in out_sizes.into_iter().zip(sizes) {
        assert_size(actual, expected);
    }
}

#[test]
fn colors_map_to_their_complement() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tint.pdf");
    let output = dir.path().join("tint_out.pdf");
    write_fixture(&input, &[(200.0, 200.0)], &split_image(TINT, LIGHT));

    invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap();

    let (left, _) = sample_halves(&output);
    assert_close(left, Rgb([55, 215, 165]), "tinted half");
}

#[test]
fn inverting_twice_restores_the_original_colors() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("twice.pdf");
    let once = dir.path().join("once.pdf");
    let twice = dir.path().join("twice_back.pdf");
    write_fixture(&input, &[(200.0, 200.0)], &split_image(TINT, DARK));

    let config = InversionConfig::default();
    invert_pdf(&input, Some(&once), &config).unwrap();
    invert_pdf(&once, Some(&twice), &config).unwrap();

    let (left, right) = sample_halves(&twice);
    assert_close(left, TINT, "tinted half");
    assert_close(right, DARK, "dark half");
}

#[test]
fn default_output_path_is_derived_and_overwritten() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pdf");
    write_fixture(&input, &[(300.0, 400.0)], &split_image(DARK, LIGHT));
    let expected: PathBuf = dir.path().join("report_inverted.pdf");
    std::fs::write(&expected, b"stale").unwrap();

    let report = invert_pdf(&input, None::<&Path>, &InversionConfig::default()).unwrap();

    assert_eq!(report.output_path, expected);
    let bytes = std::fs::read(&expected).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    // A second run replaces the first result.
    invert_pdf(&input, None::<&Path>, &InversionConfig::default()).unwrap();
    assert_eq!(page_sizes(&expected).len(), 1);
}

#[test]
fn output_directories_are_created() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let output = dir.path().join("a/b/out.pdf");
    write_fixture(&input, &[(200.0, 200.0)], &split_image(DARK, LIGHT));

    invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap();

    assert!(output.exists());
}

#[test]
fn unreadable_pdf_fails_without_output() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pdf");
    let output = dir.path().join("broken_out.pdf");
    std::fs::write(&input, b"this is not really a pdf").unwrap();

    let err = invert_pdf(&input, Some(&output), &InversionConfig::default()).unwrap_err();

    assert!(matches!(err, InvertError::OpenFailed { .. }));
    assert!(err
        .status_message()
        .starts_with("Error inverting PDF colors: "));
    assert!(!output.exists());
}

#[test]
fn assembled_pages_are_checked_against_their_sources() {
    let _guard = skip_unless_pdfium!();
    let pdfium = bind_pdfium(None).unwrap();
    let mut document = pdfium.create_new_pdf().unwrap();
    let raster = split_image(DARK, LIGHT);
    let report = |page_num, w, h| PageReport {
        page_num,
        geometry: PageGeometry::new(w, h),
        raster_width: 200,
        raster_height: 200,
    };
    let pages = vec![report(1, 612.0, 792.0), report(2, 842.0, 595.0)];
    for page in &pages {
        assemble::append_raster_page(&mut document, page.page_num, page.geometry, &raster)
            .unwrap();
    }

    assemble::verify_output(&document, &pages).unwrap();

    let swapped = vec![report(1, 612.0, 792.0), report(2, 595.0, 842.0)];
    let err = assemble::verify_output(&document, &swapped).unwrap_err();
    assert!(
        matches!(err, InvertError::PageGeometryMismatch { page: 2, .. }),
        "got {err:?}"
    );

    let extra = vec![
        report(1, 612.0, 792.0),
        report(2, 842.0, 595.0),
        report(3, 100.0, 100.0),
    ];
    let err = assemble::verify_output(&document, &extra).unwrap_err();
    assert!(matches!(
        err,
        InvertError::PageCountMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn custom_scale_changes_raster_size() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scaled.pdf");
    let output = dir.path().join("scaled_out.pdf");
    write_fixture(&input, &[(200.0, 100.0)], &split_image(DARK, LIGHT));
    let config = InversionConfig::builder().scale(1.0).build().unwrap();

    let report = invert_pdf(&input, Some(&output), &config).unwrap();

    let page = &report.pages[0];
    assert_eq!((page.raster_width, page.raster_height), (200, 100));
    assert_size(page_sizes(&output)[0], (200.0, 100.0));
}

#[test]
fn progress_events_arrive_in_page_order() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("progress.pdf");
    let output = dir.path().join("progress_out.pdf");
    write_fixture(
        &input,
        &[(100.0, 50.0), (50.0, 100.0)],
        &split_image(DARK, LIGHT),
    );
    let recorder = Arc::new(RecordingCallback::default());
    let config = InversionConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    invert_pdf(&input, Some(&output), &config).unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 2",
            "page 1/2",
            "done 1/2 200x100",
            "page 2/2",
            "done 2/2 100x200",
            "complete 2",
        ]
    );
}

#[test]
fn bytes_variant_returns_an_inverted_document() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mem.pdf");
    write_fixture(&input, &[(300.0, 200.0)], &split_image(DARK, LIGHT));
    let source = std::fs::read(&input).unwrap();

    let (bytes, pages) = invert_pdf_bytes(&source, &InversionConfig::default()).unwrap();

    assert_eq!(pages.len(), 1);
    let output = dir.path().join("mem_out.pdf");
    std::fs::write(&output, &bytes).unwrap();
    assert_size(page_sizes(&output)[0], (300.0, 200.0));
    let (left, right) = sample_halves(&output);
    assert_close(left, LIGHT, "black half");
    assert_close(right, DARK, "white half");
}

#[tokio::test]
async fn async_variant_matches_the_blocking_one() {
    let _guard = skip_unless_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("async.pdf");
    write_fixture(&input, &[(250.0, 250.0)], &split_image(DARK, LIGHT));

    let report = invert_pdf_async(&input, None::<&Path>, &InversionConfig::default())
        .await
        .unwrap();

    assert_eq!(report.output_path, dir.path().join("async_inverted.pdf"));
    assert_eq!(report.page_count(), 1);
}
