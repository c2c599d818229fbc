//! TSPL encoding for TSC thermal label printers.
//!
//! [`TsplCommands`] is a small builder over the command language; [`encode`]
//! turns a [`PageArtifact`] into a complete print job. The artifact is
//! usually composed at a higher resolution than the print head, so every
//! position and bitmap is rescaled to the printer's resolution.
//!
//! ```
//! use labelstation_label::tspl::TsplCommands;
//!
//! let job = TsplCommands::new()
//!     .size(51.0, 25.0)
//!     .gap(2.0)
//!     .cls()
//!     .print(1)
//!     .into_bytes();
//!
//! assert_eq!(job, b"SIZE 51 mm,25 mm\r\nGAP 2 mm,0 mm\r\nCLS\r\nPRINT 1\r\n");
//! ```

use crate::artifact::PageArtifact;
use crate::units::{pt_to_dots, rescale};
use image::GrayImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// Luma values below this print as a dot.
const BLACK_THRESHOLD: u8 = 128;

/// Printer-side job settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    /// Print head resolution.
    pub dpi: u32,
    /// Gap between labels on the roll.
    pub gap_mm: f64,
    /// Darkness, 0-15.
    pub density: u8,
    /// Inches per second.
    pub speed: u8,
    pub direction: u8,
    /// Reference point offset in dots.
    pub reference_x: u32,
    pub reference_y: u32,
    pub tear: bool,
    pub copies: u32,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            dpi: 300,
            gap_mm: 2.0,
            density: 8,
            speed: 4,
            direction: 1,
            reference_x: 0,
            reference_y: 0,
            tear: true,
            copies: 1,
        }
    }
}

/// Builder for a TSPL command stream.
#[derive(Debug, Clone, Default)]
pub struct TsplCommands {
    buf: Vec<u8>,
}

impl TsplCommands {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(mut self, command: &str) -> Self {
        self.buf.extend_from_slice(command.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn size(self, width_mm: f64, height_mm: f64) -> Self {
        self.line(&format!("SIZE {width_mm} mm,{height_mm} mm"))
    }

    pub fn gap(self, gap_mm: f64) -> Self {
        self.line(&format!("GAP {gap_mm} mm,0 mm"))
    }

    pub fn direction(self, direction: u8) -> Self {
        self.line(&format!("DIRECTION {direction}"))
    }

    pub fn reference(self, x: u32, y: u32) -> Self {
        self.line(&format!("REFERENCE {x},{y}"))
    }

    pub fn tear(self, on: bool) -> Self {
        self.line(if on { "SET TEAR ON" } else { "SET TEAR OFF" })
    }

    pub fn density(self, density: u8) -> Self {
        self.line(&format!("DENSITY {density}"))
    }

    pub fn speed(self, speed: u8) -> Self {
        self.line(&format!("SPEED {speed}"))
    }

    pub fn cls(self) -> Self {
        self.line("CLS")
    }

    /// Scalable-font text with its top-left corner at (`x`, `y`).
    pub fn text(self, x: u32, y: u32, size_pt: u32, content: &str) -> Self {
        let escaped = content.replace('"', "\\[\"]");
        self.line(&format!("TEXT {x},{y},\"0\",0,{size_pt},{size_pt},\"{escaped}\""))
    }

    /// Monochrome bitmap with its top-left corner at (`x`, `y`).
    ///
    /// A cleared bit prints a dot.
    pub fn bitmap(mut self, x: u32, y: u32, image: &GrayImage) -> Self {
        let width_bytes = image.width().div_ceil(8);
        let header = format!("BITMAP {x},{y},{width_bytes},{},0,", image.height());
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(&pack_rows(image));
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn print(self, copies: u32) -> Self {
        self.line(&format!("PRINT {copies}"))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Pack a grayscale image into TSPL bitmap rows, one bit per dot,
/// most significant bit first, padding bits white.
fn pack_rows(image: &GrayImage) -> Vec<u8> {
    let width_bytes = image.width().div_ceil(8) as usize;
    let mut out = vec![0xFF; width_bytes * image.height() as usize];

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] < BLACK_THRESHOLD {
            let idx = y as usize * width_bytes + (x / 8) as usize;
            out[idx] &= !(0x80 >> (x % 8));
        }
    }

    out
}

fn is_blank(image: &GrayImage) -> bool {
    image.pixels().all(|p| p[0] >= BLACK_THRESHOLD)
}

fn scale_image(image: &GrayImage, from_dpi: u32, to_dpi: u32) -> GrayImage {
    let width = rescale(image.width(), from_dpi, to_dpi).max(1);
    let height = rescale(image.height(), from_dpi, to_dpi).max(1);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Nearest)
}

/// Encode `artifact` as a complete TSPL job.
///
/// Blank base artwork is omitted. Text anchors are baselines in the artifact
/// but top-left corners in TSPL, so each run is raised by its cap height.
pub fn encode(artifact: &PageArtifact, settings: &PrintSettings) -> Vec<u8> {
    let from = artifact.dpi;
    let to = settings.dpi;

    let mut job = TsplCommands::new()
        .size(artifact.width_mm, artifact.height_mm)
        .gap(settings.gap_mm)
        .direction(settings.direction)
        .reference(settings.reference_x, settings.reference_y)
        .tear(settings.tear)
        .density(settings.density)
        .speed(settings.speed)
        .cls();

    if !is_blank(&artifact.base) {
        job = job.bitmap(0, 0, &scale_image(&artifact.base, from, to));
    }

    if let Some(symbol) = &artifact.symbol {
        job = job.bitmap(
            rescale(symbol.x_dots, from, to),
            rescale(symbol.y_dots, from, to),
            &scale_image(&symbol.image, from, to),
        );
    }

    for text in &artifact.texts {
        // Cap height taken as 3/4 of the em size.
        let cap = pt_to_dots(text.font_pt * 0.75, to);
        let size = text.font_pt.round().max(1.0) as u32;
        let x = rescale(text.x_dots, from, to);
        let y = rescale(text.y_dots, from, to).saturating_sub(cap);
        job = job.text(x, y, size, &text.text);
        // The built-in font has no bold weight; strike the run again one dot right.
        if text.bold {
            job = job.text(x + 1, y, size, &text.text);
        }
    }

    job.print(settings.copies).into_bytes()
}
