//! Progress-callback trait for per-page inversion events.
//!
//! Inject an [`Arc<dyn InversionProgressCallback>`] via
//! [`crate::config::InversionConfigBuilder::progress_callback`] to follow a
//! conversion page by page (the CLI drives its progress bar this way).
//!
//! Pages are processed strictly in order on the calling thread, so events
//! arrive in order: `on_conversion_start`, then `on_page_start` /
//! `on_page_complete` for each page, then `on_conversion_complete`. A failing
//! page emits `on_page_error` and ends the sequence.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_invert::{InversionConfig, InversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl InversionProgressCallback for Counter {
//!     fn on_page_complete(&self, _page: usize, _total: usize, _w: u32, _h: u32) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = InversionConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

/// Called by the conversion loop as it processes each page.
///
/// All methods default to no-ops so implementors override only what they
/// need. `Send + Sync` lets the callback travel into
/// [`crate::convert::invert_pdf_async`]'s blocking task.
pub trait InversionProgressCallback: Send + Sync {
    /// Called once the source document is open.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is rasterised (1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after the inverted page has been embedded.
    ///
    /// `raster_width` / `raster_height` are the rendered bitmap size in pixels.
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        raster_width: u32,
        raster_height: u32,
    ) {
        let _ = (page_num, total_pages, raster_width, raster_height);
    }

    /// Called when a page fails; no further page events follow.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called after every page has been inverted and the output serialised.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl InversionProgressCallback for NoopProgressCallback {}
