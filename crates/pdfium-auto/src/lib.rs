//! # pdfium-auto
//!
//! Make a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! available to `pdfium-render` without asking the user to install one.
//!
//! ## Resolution order
//!
//! [`ensure_pdfium_library`] returns the first hit of:
//!
//! 1. `PDFIUM_LIB_PATH` — an existing library chosen by the user.
//! 2. `<cache>/pdfinvert/pdfium-{VERSION}/` — a library fetched earlier.
//! 3. A fresh download of the platform `.tgz` from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    unpacked into the cache directory.
//!
//! With the `bundled` feature, [`ensure_pdfium_bundled`] writes a copy of the
//! library embedded at compile time into the same cache directory instead.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_auto::{bind_pdfium_from_path, ensure_pdfium_library};
//!
//! let location = ensure_pdfium_library(Some(&|downloaded, total| {
//!     if let Some(t) = total {
//!         eprint!("\rDownloading PDFium: {}/{} bytes", downloaded, t);
//!     }
//! })).expect("download failed");
//! let pdfium = bind_pdfium_from_path(location.path()).expect("bind failed");
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library; skips download.
//! - `PDFIUM_AUTO_CACHE_DIR` — override the default cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Application directory created under the platform cache directory.
pub const CACHE_APP_DIR: &str = "pdfinvert";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";
const CACHE_DIR_ENV: &str = "PDFIUM_AUTO_CACHE_DIR";

/// Errors returned by pdfium-auto operations.
#[derive(Error, Debug)]
pub enum PdfiumAutoError {
    /// The current OS/architecture combination has no prebuilt library.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create or write into the local cache directory.
    #[error("Cache directory error at '{}': {source}", .path.display())]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{}': {reason}", .path.display())]
    Bind { path: PathBuf, reason: String },
}

/// Where a usable pdfium library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    /// `PDFIUM_LIB_PATH` pointed at an existing file.
    Env(PathBuf),
    /// Already present in the cache directory.
    Cache(PathBuf),
    /// Downloaded and unpacked during this process.
    Downloaded(PathBuf),
    /// Extracted from the bytes embedded by the `bundled` feature.
    Bundled(PathBuf),
}

impl LibraryLocation {
    pub fn path(&self) -> &Path {
        match self {
            LibraryLocation::Env(p)
            | LibraryLocation::Cache(p)
            | LibraryLocation::Downloaded(p)
            | LibraryLocation::Bundled(p) => p,
        }
    }
}

// ── Platform table ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct PlatformInfo {
    os: &'static str,
    arch: &'static str,
    /// Asset filename in the GitHub release, e.g. `pdfium-linux-x64.tgz`.
    archive_name: &'static str,
    /// Relative path inside the archive, e.g. `lib/libpdfium.so`.
    lib_path_in_archive: &'static str,
    /// Filename written to the cache directory.
    lib_name: &'static str,
}

const PLATFORMS: &[PlatformInfo] = &[
    PlatformInfo {
        os: "macos",
        arch: "aarch64",
        archive_name: "pdfium-mac-arm64.tgz",
        lib_path_in_archive: "lib/libpdfium.dylib",
        lib_name: "libpdfium.dylib",
    },
    PlatformInfo {
        os: "macos",
        arch: "x86_64",
        archive_name: "pdfium-mac-x64.tgz",
        lib_path_in_archive: "lib/libpdfium.dylib",
        lib_name: "libpdfium.dylib",
    },
    PlatformInfo {
        os: "linux",
        arch: "x86_64",
        archive_name: "pdfium-linux-x64.tgz",
        lib_path_in_archive: "lib/libpdfium.so",
        lib_name: "libpdfium.so",
    },
    PlatformInfo {
        os: "linux",
        arch: "aarch64",
        archive_name: "pdfium-linux-arm64.tgz",
        lib_path_in_archive: "lib/libpdfium.so",
        lib_name: "libpdfium.so",
    },
    PlatformInfo {
        os: "windows",
        arch: "x86_64",
        archive_name: "pdfium-win-x64.tgz",
        lib_path_in_archive: "bin/pdfium.dll",
        lib_name: "pdfium.dll",
    },
    PlatformInfo {
        os: "windows",
        arch: "aarch64",
        archive_name: "pdfium-win-arm64.tgz",
        lib_path_in_archive: "bin/pdfium.dll",
        lib_name: "pdfium.dll",
    },
    PlatformInfo {
        os: "windows",
        arch: "x86",
        archive_name: "pdfium-win-x86.tgz",
        lib_path_in_archive: "bin/pdfium.dll",
        lib_name: "pdfium.dll",
    },
];

fn platform_for(os: &str, arch: &str) -> Result<PlatformInfo, PdfiumAutoError> {
    PLATFORMS
        .iter()
        .find(|p| p.os == os && p.arch == arch)
        .copied()
        .ok_or_else(|| PdfiumAutoError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn detect_platform() -> Result<PlatformInfo, PdfiumAutoError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

/// Download URL of the pdfium archive for the current platform.
pub fn download_url() -> Result<String, PdfiumAutoError> {
    let info = detect_platform()?;
    Ok(format!(
        "{}/chromium%2F{}/{}",
        BASE_URL, PDFIUM_VERSION, info.archive_name
    ))
}

// ── Cache directory ──────────────────────────────────────────────────────────

/// Returns the per-version cache directory for the PDFium library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdfinvert/pdfium-{VERSION}/`
/// - **Linux**: `~/.cache/pdfinvert/pdfium-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\pdfinvert\pdfium-{VERSION}\`
///
/// Override by setting `PDFIUM_AUTO_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var(CACHE_DIR_ENV) {
        if !override_dir.is_empty() {
            return PathBuf::from(override_dir).join(format!("pdfium-{PDFIUM_VERSION}"));
        }
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join(CACHE_APP_DIR)
        .join(format!("pdfium-{PDFIUM_VERSION}"))
}

static RESOLVED: OnceLock<LibraryLocation> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Finds an existing pdfium library without touching the network.
///
/// Checks `PDFIUM_LIB_PATH` first, then the cache directory.
pub fn locate_pdfium_library() -> Option<LibraryLocation> {
    if let Some(location) = RESOLVED.get() {
        return Some(location.clone());
    }
    if let Ok(p) = std::env::var(LIB_PATH_ENV) {
        let path = PathBuf::from(p);
        if path.is_file() {
            return Some(LibraryLocation::Env(path));
        }
    }
    let info = detect_platform().ok()?;
    let cached = pdfium_cache_dir().join(info.lib_name);
    cached.is_file().then_some(LibraryLocation::Cache(cached))
}

/// Returns `true` when [`ensure_pdfium_library`] would not need the network.
pub fn is_pdfium_cached() -> bool {
    locate_pdfium_library().is_some()
}

/// Ensures a pdfium library is present on disk, downloading it if needed.
///
/// `on_progress` receives `(bytes_downloaded, total_size_option)` while the
/// archive is fetched. The result is memoised for the process lifetime.
pub fn ensure_pdfium_library(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<LibraryLocation, PdfiumAutoError> {
    if let Some(location) = locate_pdfium_library() {
        debug!("pdfium library found: {:?}", location);
        let _ = RESOLVED.set(location.clone());
        return Ok(location);
    }

    if let Ok(p) = std::env::var(LIB_PATH_ENV) {
        warn!("{LIB_PATH_ENV} '{p}' not found; downloading pdfium instead");
    }

    let info = detect_platform()?;
    let cache_dir = pdfium_cache_dir();
    let lib_path = cache_dir.join(info.lib_name);
    let url = download_url()?;

    std::fs::create_dir_all(&cache_dir).map_err(|source| PdfiumAutoError::CacheDir {
        path: cache_dir.clone(),
        source,
    })?;

    info!("Downloading pdfium {} from {}", PDFIUM_VERSION, url);
    let archive_bytes = download_bytes(&url, on_progress)?;
    extract_library(&archive_bytes, info.lib_path_in_archive, &lib_path)?;
    info!("pdfium cached at {}", lib_path.display());

    let location = LibraryLocation::Downloaded(lib_path);
    let _ = RESOLVED.set(location.clone());
    Ok(location)
}

#[cfg(feature = "bundled")]
mod bundled {
    include!(concat!(env!("OUT_DIR"), "/bundled.rs"));
}

/// Writes the pdfium library embedded at compile time into the cache
/// directory (once) and returns its location.
///
/// A cached file whose size differs from the embedded bytes is replaced.
#[cfg(feature = "bundled")]
pub fn ensure_pdfium_bundled() -> Result<LibraryLocation, PdfiumAutoError> {
    if let Some(location) = RESOLVED.get() {
        return Ok(location.clone());
    }

    let info = detect_platform()?;
    let cache_dir = pdfium_cache_dir();
    let lib_path = cache_dir.join(info.lib_name);
    let bytes = bundled::PDFIUM_BYTES;

    let up_to_date = std::fs::metadata(&lib_path)
        .map(|m| m.len() == bytes.len() as u64)
        .unwrap_or(false);

    if !up_to_date {
        let cache_err = |source| PdfiumAutoError::CacheDir {
            path: cache_dir.clone(),
            source,
        };
        std::fs::create_dir_all(&cache_dir).map_err(cache_err)?;
        let partial = lib_path.with_extension("part");
        std::fs::write(&partial, bytes).map_err(cache_err)?;
        std::fs::rename(&partial, &lib_path).map_err(cache_err)?;
        debug!("Extracted bundled pdfium to {}", lib_path.display());
    }

    let location = LibraryLocation::Bundled(lib_path);
    let _ = RESOLVED.set(location.clone());
    Ok(location)
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumAutoError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumAutoError::Bind {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Streams a URL into memory, calling `on_progress` every 64 KiB.
fn download_bytes(
    url: &str,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, PdfiumAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumAutoError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumAutoError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PdfiumAutoError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(32 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; 64 * 1024];
    let mut downloaded: u64 = 0;

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                downloaded += n as u64;
                if let Some(cb) = on_progress {
                    cb(downloaded, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PdfiumAutoError::Download(format!("Read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Unpacks one member of a gzipped tar archive to `dest_path`.
///
/// The member is written next to the destination first and renamed into
/// place, so an interrupted extraction never leaves a truncated library in
/// the cache.
fn extract_library(
    archive_bytes: &[u8],
    lib_path_in_archive: &str,
    dest_path: &Path,
) -> Result<(), PdfiumAutoError> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    let extract_err = |e: std::io::Error| PdfiumAutoError::Extract(e.to_string());

    for entry in archive.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        let matches = entry.path().map_err(extract_err)?.to_string_lossy() == lib_path_in_archive;
        if !matches {
            continue;
        }

        let partial = dest_path.with_extension("part");
        entry
            .unpack(&partial)
            .map_err(|e| PdfiumAutoError::Extract(format!("Unpack failed: {e}")))?;
        std::fs::rename(&partial, dest_path).map_err(|source| PdfiumAutoError::CacheDir {
            path: dest_path.to_path_buf(),
            source,
        })?;
        return Ok(());
    }

    Err(PdfiumAutoError::Extract(format!(
        "Library '{lib_path_in_archive}' not found in archive"
    )))
}
