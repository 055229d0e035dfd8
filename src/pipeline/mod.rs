//! Pipeline stages for PDF color inversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the rendering backend stays confined to two files.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ invert ──▶ assemble
//! (checks)  (pdfium)   (image)    (pdfium + atomic write)
//! ```
//!
//! 1. [`input`]    — pre-flight checks and output-path derivation
//! 2. [`render`]   — bind pdfium, open the source, rasterise one page
//! 3. [`invert`]   — per-pixel color inversion of the raster
//! 4. [`assemble`] — geometry-matched output page, full-page image, save

pub mod assemble;
pub mod input;
pub mod invert;
pub mod render;
