//! Background image resolution.
//!
//! The core only knows an opaque [`ImageSource`]; a loader turns it into
//! pixels when an export needs them.

use crate::export::ExportError;
use image::{DynamicImage, Rgba, RgbaImage};
use ov_core::model::{Color, ImageSource};
use std::collections::HashMap;
use std::path::PathBuf;

/// Side length of the generated placeholder image.
const PLACEHOLDER_SIZE: u32 = 500;

pub trait ImageLoader {
    /// Decode the background for `source`. `ImageSource::Default` must
    /// resolve to a placeholder rather than fail.
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, ExportError>;
}

/// A flat placeholder used when no image was chosen.
pub fn placeholder_image(color: Color) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgba(color.to_rgba8()),
    ))
}

fn decode(handle: &str, bytes: &[u8]) -> Result<DynamicImage, ExportError> {
    image::load_from_memory(bytes).map_err(|source| ExportError::Decode {
        handle: handle.to_string(),
        source,
    })
}

/// Treats handles as filesystem paths.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    /// Image shown when no source is chosen. Falls back to a flat fill when
    /// unset or unreadable.
    pub placeholder: Option<PathBuf>,
    pub placeholder_color: Color,
}

impl Default for FsImageLoader {
    fn default() -> Self {
        Self {
            placeholder: None,
            placeholder_color: Color::from_rgba8(0xD9, 0xD9, 0xD9, 0xFF),
        }
    }
}

impl FsImageLoader {
    pub fn with_placeholder(mut self, path: impl Into<PathBuf>) -> Self {
        self.placeholder = Some(path.into());
        self
    }

    fn read(&self, handle: &str) -> Result<DynamicImage, ExportError> {
        let bytes = std::fs::read(handle).map_err(|source| ExportError::ImageLoad {
            handle: handle.to_string(),
            source,
        })?;
        decode(handle, &bytes)
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, ExportError> {
        match source {
            ImageSource::Handle(handle) => self.read(handle),
            ImageSource::Default => {
                if let Some(path) = &self.placeholder {
                    match self.read(&path.to_string_lossy()) {
                        Ok(img) => return Ok(img),
                        Err(e) => log::warn!("placeholder unavailable, using flat fill: {e}"),
                    }
                }
                Ok(placeholder_image(self.placeholder_color))
            }
        }
    }
}

/// Serves encoded images registered under their handle. Used where there is
/// no filesystem (the browser hands over bytes for each blob URL).
#[derive(Debug, Clone)]
pub struct MemoryImageLoader {
    images: HashMap<String, Vec<u8>>,
    placeholder: Option<Vec<u8>>,
    pub placeholder_color: Color,
}

impl Default for MemoryImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            placeholder: None,
            placeholder_color: FsImageLoader::default().placeholder_color,
        }
    }

    pub fn insert(&mut self, handle: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(handle.into(), bytes);
    }

    pub fn remove(&mut self, handle: &str) -> bool {
        self.images.remove(handle).is_some()
    }

    pub fn set_placeholder(&mut self, bytes: Option<Vec<u8>>) {
        self.placeholder = bytes;
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, source: &ImageSource) -> Result<DynamicImage, ExportError> {
        match source {
            ImageSource::Handle(handle) => {
                let bytes = self
                    .images
                    .get(handle)
                    .ok_or_else(|| ExportError::UnknownImage(handle.clone()))?;
                decode(handle, bytes)
            }
            ImageSource::Default => match &self.placeholder {
                Some(bytes) => decode("placeholder", bytes),
                None => Ok(placeholder_image(self.placeholder_color)),
            },
        }
    }
}
