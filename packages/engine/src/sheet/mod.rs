mod engine;
mod host;
mod layer;
pub mod rule;
mod virtual_sheet;

pub use engine::StyleEngine;
pub use host::{SheetBackend, SheetHost};
pub use layer::Layer;
pub use rule::{CssRule, Declaration, StyleRule};
pub use virtual_sheet::{SharedSheet, VirtualDocument, VirtualSheet};
