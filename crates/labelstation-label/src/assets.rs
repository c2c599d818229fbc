//! Base template artwork.
//!
//! The dynamic overlay is always drawn onto the template's base artwork so
//! that regulatory marks and logos printed on every label survive. Artwork
//! is read from disk on every composition.

use crate::error::{LabelError, Result};
use crate::template::LabelTemplate;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of base artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseAssets {
    /// Read `<dir>/<template.base_asset>`.
    Directory(PathBuf),
    /// Plain white stock, no artwork. Only chosen explicitly.
    Blank,
}

impl BaseAssets {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Directory(dir.into())
    }

    /// Path of the artwork for `template`, if backed by a directory.
    pub fn path_for(&self, template: &LabelTemplate) -> Option<PathBuf> {
        match self {
            Self::Directory(dir) => Some(dir.join(&template.base_asset)),
            Self::Blank => None,
        }
    }

    /// Load the base page for `template` at exactly `width` x `height` dots.
    ///
    /// Artwork of a different resolution is resampled to the page size.
    ///
    /// # Errors
    /// `LabelError::AssetMissing` or `LabelError::AssetUnreadable`.
    pub fn load(&self, template: &LabelTemplate, width: u32, height: u32) -> Result<GrayImage> {
        let Some(path) = self.path_for(template) else {
            return Ok(GrayImage::from_pixel(width, height, Luma([255])));
        };

        let art = read_artwork(&path)?;
        if art.dimensions() == (width, height) {
            return Ok(art);
        }

        debug!(
            "Resampling {} from {}x{} to {}x{}",
            path.display(),
            art.width(),
            art.height(),
            width,
            height
        );
        Ok(imageops::resize(&art, width, height, FilterType::Triangle))
    }
}

fn read_artwork(path: &Path) -> Result<GrayImage> {
    if !path.is_file() {
        return Err(LabelError::AssetMissing {
            path: path.to_path_buf(),
        });
    }

    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|e| LabelError::AssetUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
