//! Label templates and the built-in registry.
//!
//! A template is pure data: a page size, the base artwork to draw on, a list
//! of text fields and one symbol region. Coordinates are millimetres with
//! the origin at the bottom-left corner of the label, the convention used by
//! the label artwork. Text anchors are baseline starts; the symbol anchor is
//! its bottom-left corner.

use crate::error::{LabelError, Result};
use labelstation_core::DeviceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    fn contains(&self, x_mm: f64, y_mm: f64) -> bool {
        (0.0..=self.width_mm).contains(&x_mm) && (0.0..=self.height_mm).contains(&y_mm)
    }
}

/// Where a field's text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Fixed text printed on every label of this type.
    Literal(String),
    /// The serial number being issued.
    Serial,
}

impl FieldValue {
    /// Text to print for `serial`.
    pub fn resolve(&self, serial: &str) -> String {
        match self {
            FieldValue::Literal(text) => text.clone(),
            FieldValue::Serial => serial.to_string(),
        }
    }
}

/// One text field on a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub x_mm: f64,
    pub y_mm: f64,
    pub font_pt: f64,
    pub bold: bool,
    pub value: FieldValue,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, x_mm: f64, y_mm: f64, font_pt: f64, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            x_mm,
            y_mm,
            font_pt,
            bold: false,
            value,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }
}

/// Square region holding the machine-readable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolRegion {
    pub x_mm: f64,
    pub y_mm: f64,
    pub size_mm: f64,
}

/// Layout of one device type's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTemplate {
    pub device_type: DeviceType,
    pub page: PageSize,
    /// File name of the base artwork inside the asset directory.
    pub base_asset: String,
    pub fields: Vec<FieldSpec>,
    pub symbol: SymbolRegion,
}

impl LabelTemplate {
    /// Check that every field anchor and the whole symbol square lie on the
    /// page.
    ///
    /// # Errors
    /// Returns `LabelError::OutOfBounds` naming the first offending element.
    pub fn check_bounds(&self) -> Result<()> {
        for field in &self.fields {
            if !self.page.contains(field.x_mm, field.y_mm) {
                return Err(self.out_of_bounds(&field.name, field.x_mm, field.y_mm));
            }
        }

        let s = &self.symbol;
        let inside = s.size_mm > 0.0
            && self.page.contains(s.x_mm, s.y_mm)
            && self.page.contains(s.x_mm + s.size_mm, s.y_mm + s.size_mm);
        if !inside {
            return Err(self.out_of_bounds("symbol", s.x_mm, s.y_mm));
        }

        Ok(())
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn out_of_bounds(&self, element: &str, x_mm: f64, y_mm: f64) -> LabelError {
        LabelError::OutOfBounds {
            device_type: self.device_type,
            element: element.to_string(),
            x_mm,
            y_mm,
            width_mm: self.page.width_mm,
            height_mm: self.page.height_mm,
        }
    }
}

/// Electrical ratings printed on a label.
struct Ratings {
    current: &'static str,
    power: &'static str,
    capacity: &'static str,
    energy: &'static str,
}

const STANDARD_RATINGS: Ratings = Ratings {
    current: "0.5 A",
    power: "2.5 W",
    capacity: "1000 mAh",
    energy: "3.7 Wh",
};

const EXTENDED_RATINGS: Ratings = Ratings {
    current: "0.8 A",
    power: "4.0 W",
    capacity: "1500 mAh",
    energy: "5.55 Wh",
};

/// One row per device type: (type, FCC id, ratings, base artwork).
const BUILTIN: [(DeviceType, &str, &Ratings, &str); 4] = [
    (DeviceType::Rc102, "2BDDP-102", &STANDARD_RATINGS, "templ_102.png"),
    (DeviceType::Rc103, "2BDDP-103", &STANDARD_RATINGS, "templ_103.png"),
    (DeviceType::Rc103G, "2BDDP-103", &STANDARD_RATINGS, "templ_103g.png"),
    (DeviceType::Rc110, "2BDDP-110", &EXTENDED_RATINGS, "templ_110.png"),
];

const LABEL_PAGE: PageSize = PageSize {
    width_mm: 51.0,
    height_mm: 25.0,
};

const SERIAL_PT: f64 = 6.0;
const SMALL_PT: f64 = 4.0;

fn standard_layout(
    device_type: DeviceType,
    fcc_id: &str,
    ratings: &Ratings,
    base_asset: &str,
) -> LabelTemplate {
    let lit = |s: &str| FieldValue::Literal(s.to_string());

    LabelTemplate {
        device_type,
        page: LABEL_PAGE,
        base_asset: base_asset.to_string(),
        fields: vec![
            FieldSpec::new("serial", 33.55, 16.85, SERIAL_PT, FieldValue::Serial).bold(),
            FieldSpec::new(
                "type",
                2.0,
                19.0,
                SMALL_PT,
                lit(&format!("Type RADIACODE-{}", device_type.model())),
            ),
            FieldSpec::new("fcc_id", 25.0, 2.0, SMALL_PT, lit(&format!("FCC ID: {fcc_id}"))),
            FieldSpec::new("input_voltage", 23.5, 13.1, SMALL_PT, lit("5.0 V")),
            FieldSpec::new("input_current", 34.5, 13.1, SMALL_PT, lit(ratings.current)),
            FieldSpec::new("input_power", 44.4, 13.1, SMALL_PT, lit(ratings.power)),
            FieldSpec::new("battery_voltage", 23.5, 11.2, SMALL_PT, lit("3.7 V")),
            FieldSpec::new("battery_capacity", 33.2, 11.2, SMALL_PT, lit(ratings.capacity)),
            FieldSpec::new("battery_energy", 44.1, 11.2, SMALL_PT, lit(ratings.energy)),
        ],
        symbol: SymbolRegion {
            x_mm: 18.0,
            y_mm: 4.1,
            size_mm: 5.0,
        },
    }
}

/// Immutable set of label templates keyed by device type.
///
/// # Examples
///
/// ```
/// use labelstation_core::DeviceType;
/// use labelstation_label::TemplateRegistry;
///
/// let registry = TemplateRegistry::builtin();
/// let template = registry.get(DeviceType::Rc110).unwrap();
/// assert_eq!(template.page.width_mm, 51.0);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateRegistry {
    templates: BTreeMap<DeviceType, LabelTemplate>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a template for every known device type.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (device_type, fcc_id, ratings, asset) in BUILTIN {
            registry.insert(standard_layout(device_type, fcc_id, ratings, asset));
        }
        registry
    }

    /// Add or replace the template for its device type.
    pub fn insert(&mut self, template: LabelTemplate) {
        self.templates.insert(template.device_type, template);
    }

    pub fn get(&self, device_type: DeviceType) -> Option<&LabelTemplate> {
        self.templates.get(&device_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Check every template for missing device types and out-of-page
    /// elements. Run once at startup.
    pub fn validate(&self) -> Result<()> {
        for device_type in DeviceType::ALL {
            let template = self
                .get(device_type)
                .ok_or(LabelError::UnknownTemplate { device_type })?;
            template.check_bounds()?;
        }
        Ok(())
    }
}
