//! Label composition.
//!
//! One generic routine interprets any [`LabelTemplate`]: it loads the base
//! artwork, places every text field and asks the renderer for the symbol.
//! Composition is deterministic for a given template, artwork and renderer.

use crate::artifact::{PageArtifact, PlacedSymbol, PlacedText};
use crate::assets::BaseAssets;
use crate::error::{LabelError, Result};
use crate::renderer::{SymbolRenderer, fit_square};
use crate::template::{LabelTemplate, TemplateRegistry};
use crate::units::mm_to_dots;
use labelstation_core::DeviceType;
use labelstation_core::constants::DEFAULT_PRINT_DPI;
use tracing::{debug, warn};

/// Composes print-ready label pages from the template registry.
///
/// # Examples
///
/// ```
/// use labelstation_core::DeviceType;
/// use labelstation_label::{BaseAssets, LabelComposer, TemplateRegistry, UnavailableRenderer};
///
/// let composer = LabelComposer::new(
///     TemplateRegistry::builtin(),
///     BaseAssets::Blank,
///     UnavailableRenderer,
/// );
///
/// let page = composer
///     .compose("RC-103-000123", DeviceType::Rc103, b"RC-103-000123")
///     .unwrap();
///
/// assert_eq!(page.text("serial").unwrap().text, "RC-103-000123");
/// assert!(!page.has_symbol());
/// ```
pub struct LabelComposer {
    registry: TemplateRegistry,
    assets: BaseAssets,
    renderer: Box<dyn SymbolRenderer>,
    dpi: u32,
}

impl LabelComposer {
    pub fn new(
        registry: TemplateRegistry,
        assets: BaseAssets,
        renderer: impl SymbolRenderer + 'static,
    ) -> Self {
        Self {
            registry,
            assets,
            renderer: Box::new(renderer),
            dpi: DEFAULT_PRINT_DPI,
        }
    }

    /// Set the artifact resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn assets(&self) -> &BaseAssets {
        &self.assets
    }

    /// Compose the label for `serial` using the template of `device_type`,
    /// encoding `payload` in the symbol region.
    ///
    /// A symbol that cannot be rendered is logged and left out; every other
    /// failure aborts composition.
    ///
    /// # Errors
    /// - `LabelError::UnknownTemplate` if `device_type` has no template
    /// - `LabelError::OutOfBounds` if the template does not fit its page
    /// - `LabelError::AssetMissing` / `AssetUnreadable` for base artwork
    pub fn compose(
        &self,
        serial: &str,
        device_type: DeviceType,
        payload: &[u8],
    ) -> Result<PageArtifact> {
        let template = self
            .registry
            .get(device_type)
            .ok_or(LabelError::UnknownTemplate { device_type })?;

        template.check_bounds()?;

        let width_dots = mm_to_dots(template.page.width_mm, self.dpi);
        let height_dots = mm_to_dots(template.page.height_mm, self.dpi);

        let base = self.assets.load(template, width_dots, height_dots)?;
        let texts = self.place_texts(template, serial);
        let symbol = self.place_symbol(template, payload);

        debug!(
            serial,
            device_type = %device_type,
            "Composed {}x{} dot label with {} text fields, symbol: {}",
            width_dots,
            height_dots,
            texts.len(),
            symbol.is_some()
        );

        Ok(PageArtifact {
            device_type,
            serial: serial.to_string(),
            dpi: self.dpi,
            width_mm: template.page.width_mm,
            height_mm: template.page.height_mm,
            width_dots,
            height_dots,
            base,
            texts,
            symbol,
        })
    }

    fn place_texts(&self, template: &LabelTemplate, serial: &str) -> Vec<PlacedText> {
        let page_h = template.page.height_mm;

        template
            .fields
            .iter()
            .map(|field| PlacedText {
                field: field.name.clone(),
                text: field.value.resolve(serial),
                x_dots: mm_to_dots(field.x_mm, self.dpi),
                y_dots: mm_to_dots(page_h - field.y_mm, self.dpi),
                font_pt: field.font_pt,
                bold: field.bold,
            })
            .collect()
    }

    fn place_symbol(&self, template: &LabelTemplate, payload: &[u8]) -> Option<PlacedSymbol> {
        let region = &template.symbol;
        let size_px = mm_to_dots(region.size_mm, self.dpi);

        let image = match self.renderer.render_symbol(payload, size_px) {
            Ok(image) => fit_square(&image, size_px),
            Err(e) => {
                warn!(
                    device_type = %template.device_type,
                    "Symbol not rendered, continuing without it: {}",
                    e
                );
                return None;
            }
        };

        // The region anchor is its bottom-left corner.
        let top_mm = template.page.height_mm - region.y_mm - region.size_mm;

        Some(PlacedSymbol {
            x_dots: mm_to_dots(region.x_mm, self.dpi),
            y_dots: mm_to_dots(top_mm, self.dpi),
            image,
        })
    }
}
