//! Composition export: session snapshot → encoded PNG.
//!
//! An export works on a [`Composition`], an owned snapshot of the session,
//! so the live session may keep changing while pixels are produced. Only
//! one export may be in flight per exporter; a second request is rejected
//! with [`ExportError::Busy`] rather than queued.

use crate::font::{GlyphMetrics, default_font_paths, load_first_font};
use crate::loader::ImageLoader;
use crate::paint::{cover_fit, paint_labels};
use ab_glyph::FontArc;
use image::{ImageFormat, RgbaImage};
use ov_core::geom::{MAX_SURFACE_SIDE, Surface};
use ov_core::model::{ImageSource, TextLabel};
use ov_core::session::SessionState;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Export failures. None of them leave a file or partial image behind.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,

    #[error("surface has no drawable area ({width}x{height})")]
    EmptySurface { width: f64, height: f64 },

    #[error("surface {width}x{height} exceeds {max}px per side")]
    SurfaceTooLarge { width: f64, height: f64, max: u32 },

    #[error("no font available to draw {labels} label(s)")]
    FontUnavailable { labels: usize },

    #[error("cannot read image {handle}: {source}")]
    ImageLoad {
        handle: String,
        source: std::io::Error,
    },

    #[error("no image registered for handle {0}")]
    UnknownImage(String),

    #[error("cannot decode image {handle}: {source}")]
    Decode {
        handle: String,
        source: image::ImageError,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Name offered for the downloaded file.
    pub file_name: String,
    /// Fonts tried in order when the exporter starts.
    pub font_paths: Vec<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "final-image.png".to_string(),
            font_paths: default_font_paths(),
        }
    }
}

/// Point-in-time copy of everything visible on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub image_source: ImageSource,
    /// Bottom to top.
    pub labels: Vec<TextLabel>,
    pub surface: Surface,
}

impl Composition {
    pub fn capture(session: &SessionState) -> Self {
        Self {
            image_source: session.image_source().clone(),
            labels: session.labels().as_slice().to_vec(),
            surface: session.surface(),
        }
    }
}

/// Proof that the caller holds the exporter's single in-flight slot.
/// Releases the slot on drop.
pub struct ExportTicket<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ExportTicket<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct CompositionExporter<L> {
    loader: L,
    config: ExportConfig,
    font: Option<FontArc>,
    in_flight: AtomicBool,
}

impl<L: ImageLoader> CompositionExporter<L> {
    /// Create an exporter, loading the first usable font from
    /// `config.font_paths`.
    pub fn new(loader: L, config: ExportConfig) -> Self {
        let font = load_first_font(&config.font_paths);
        if font.is_none() {
            log::warn!("no font found; exports with visible labels will fail");
        }
        Self {
            loader,
            config,
            font,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create an exporter with an explicit font, skipping the path search.
    pub fn with_font(loader: L, config: ExportConfig, font: Option<FontArc>) -> Self {
        Self {
            loader,
            config,
            font,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn set_font(&mut self, font: Option<FontArc>) {
        self.font = font;
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Glyph metrics for the export font, so hit testing can match what
    /// gets drawn.
    pub fn metrics(&self) -> Option<GlyphMetrics> {
        self.font.clone().map(GlyphMetrics::new)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight slot, or fail with `Busy`.
    pub fn begin(&self) -> Result<ExportTicket<'_>, ExportError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(ExportTicket {
            flag: &self.in_flight,
        })
    }

    /// Rasterize and encode the composition as PNG.
    pub fn export(&self, composition: &Composition) -> Result<Vec<u8>, ExportError> {
        let _ticket = self.begin()?;
        let result = self.render(composition).and_then(encode_png);
        match &result {
            Ok(bytes) => log::debug!(
                "exported {} label(s) as {} bytes",
                composition.labels.len(),
                bytes.len()
            ),
            Err(e) => log::warn!("export failed: {e}"),
        }
        result
    }

    /// Snapshot the session and export it.
    pub fn export_session(&self, session: &SessionState) -> Result<Vec<u8>, ExportError> {
        self.export(&Composition::capture(session))
    }

    /// Export into `dir` under the configured file name.
    pub fn save(&self, composition: &Composition, dir: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.export(composition)?;
        let path = dir.join(&self.config.file_name);
        std::fs::write(&path, bytes)?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }

    /// Draw the composition at the surface's pixel size.
    pub fn render(&self, composition: &Composition) -> Result<RgbaImage, ExportError> {
        let surface = composition.surface;
        if surface.is_oversized() {
            return Err(ExportError::SurfaceTooLarge {
                width: surface.width,
                height: surface.height,
                max: MAX_SURFACE_SIDE,
            });
        }
        let (width, height) = surface.pixel_size().ok_or(ExportError::EmptySurface {
            width: surface.width,
            height: surface.height,
        })?;

        let visible = composition
            .labels
            .iter()
            .filter(|l| !l.content.is_empty())
            .count();
        let font = match &self.font {
            Some(font) => Some(font),
            None if visible == 0 => None,
            None => return Err(ExportError::FontUnavailable { labels: visible }),
        };

        let background = self.loader.load(&composition.image_source)?;
        let mut canvas = cover_fit(&background, width, height);
        if let Some(font) = font {
            paint_labels(&mut canvas, &composition.labels, font);
        }
        Ok(canvas)
    }
}

pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(ExportError::Encode)?;
    Ok(out.into_inner())
}
