//! Label composition for the label station.
//!
//! Given a serial number and its device type, this crate produces a
//! position-exact [`PageArtifact`]: the device type's base artwork, its fixed
//! text fields, and a machine-readable symbol carrying the serial number.
//!
//! # Components
//!
//! - [`TemplateRegistry`] - immutable, data-driven layouts keyed by
//!   [`DeviceType`](labelstation_core::DeviceType)
//! - [`LabelComposer`] - the single routine that interprets any template
//! - [`SymbolRenderer`] - pluggable symbol encoding; missing encoders degrade
//!   to a label without a symbol
//! - [`BaseAssets`] - where base artwork is read from
//! - [`tspl`] - encoding of finished pages for TSC thermal printers
//!
//! Template coordinates are millimetres from the bottom-left corner of the
//! label; artifact coordinates are dots from the top-left corner, converted
//! with `dots = mm * dpi / 25.4`.

pub mod artifact;
pub mod assets;
pub mod composer;
pub mod error;
pub mod mock;
pub mod renderer;
pub mod template;
pub mod tspl;
pub mod units;

pub use artifact::{PageArtifact, PlacedSymbol, PlacedText};
pub use assets::BaseAssets;
pub use composer::LabelComposer;
pub use error::{LabelError, RenderError, Result};
pub use renderer::{DmtxCommandRenderer, SymbolRenderer, UnavailableRenderer};
pub use template::{FieldSpec, FieldValue, LabelTemplate, PageSize, SymbolRegion, TemplateRegistry};
pub use tspl::PrintSettings;
