//! Configuration for a PDF color inversion.
//!
//! Every knob lives in [`InversionConfig`], built via
//! [`InversionConfigBuilder`]. Callers set only what they need and rely on
//! the defaults for the rest; the defaults reproduce the classic behaviour
//! (2x rasterisation, no password, auto-located pdfium).

use crate::error::InvertError;
use crate::progress::InversionProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default linear upscale factor applied when rasterising a page.
///
/// 2.0 means twice the page size in points in each dimension (4x the pixel
/// count of a 72 DPI render), which keeps small print legible.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Lower bound accepted by [`InversionConfigBuilder::scale`].
pub const MIN_SCALE: f32 = 0.25;

/// Upper bound accepted by [`InversionConfigBuilder::scale`].
pub const MAX_SCALE: f32 = 8.0;

/// Suffix inserted before the extension when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_inverted";

/// Shared, thread-safe progress callback.
pub type ProgressCallback = Arc<dyn InversionProgressCallback>;

/// Configuration for a PDF color inversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf_invert::InversionConfig;
///
/// let config = InversionConfig::builder()
///     .scale(3.0)
///     .password("secret")
///     .build()
///     .unwrap();
/// assert_eq!(config.scale, 3.0);
/// ```
#[derive(Clone)]
pub struct InversionConfig {
    /// Linear upscale factor used for rasterisation. Range: 0.25–8.0. Default: 2.0.
    pub scale: f32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit pdfium shared library. If None, the `pdfium-auto` location
    /// (`PDFIUM_LIB_PATH` or cache) is tried, then `./`, then the system library.
    pub pdfium_library: Option<PathBuf>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            password: None,
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for InversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InversionConfig")
            .field("scale", &self.scale)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn InversionProgressCallback>"),
            )
            .finish()
    }
}

impl InversionConfig {
    /// Create a new builder for `InversionConfig`.
    pub fn builder() -> InversionConfigBuilder {
        InversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`InversionConfig`].
#[derive(Debug)]
pub struct InversionConfigBuilder {
    config: InversionConfig,
}

impl InversionConfigBuilder {
    /// Set the rasterisation scale; finite values are clamped to 0.25–8.0.
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            scale
        };
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<InversionConfig, InvertError> {
        let scale = self.config.scale;
        if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(InvertError::InvalidConfig(format!(
                "scale must be a number in {MIN_SCALE}–{MAX_SCALE}, got {scale}"
            )));
        }
        Ok(self.config)
    }
}
