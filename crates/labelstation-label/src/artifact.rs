//! Composed, print-ready label pages.
//!
//! All positions are in dots of the artifact's resolution with the origin at
//! the top-left corner of the page.

use image::GrayImage;
use image::imageops;
use labelstation_core::DeviceType;

/// A text run placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Template field the text came from.
    pub field: String,
    pub text: String,
    /// Left edge of the baseline.
    pub x_dots: u32,
    /// Baseline.
    pub y_dots: u32,
    pub font_pt: f64,
    pub bold: bool,
}

/// The rendered symbol placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSymbol {
    /// Top-left corner.
    pub x_dots: u32,
    pub y_dots: u32,
    pub image: GrayImage,
}

/// A finished label page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageArtifact {
    pub device_type: DeviceType,
    pub serial: String,
    pub dpi: u32,
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_dots: u32,
    pub height_dots: u32,
    /// Base artwork, exactly `width_dots` x `height_dots`.
    pub base: GrayImage,
    pub texts: Vec<PlacedText>,
    /// `None` when the symbol could not be rendered.
    pub symbol: Option<PlacedSymbol>,
}

impl PageArtifact {
    pub fn has_symbol(&self) -> bool {
        self.symbol.is_some()
    }

    /// Text placed for the template field `field`.
    pub fn text(&self, field: &str) -> Option<&PlacedText> {
        self.texts.iter().find(|t| t.field == field)
    }

    /// Base artwork with the symbol drawn in. Text is left to the printer.
    pub fn flatten(&self) -> GrayImage {
        let mut page = self.base.clone();
        if let Some(symbol) = &self.symbol {
            imageops::replace(
                &mut page,
                &symbol.image,
                i64::from(symbol.x_dots),
                i64::from(symbol.y_dots),
            );
        }
        page
    }
}
