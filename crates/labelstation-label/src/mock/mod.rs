//! Mock renderers for testing and development.

mod renderer;

pub use renderer::FixedSymbolRenderer;
