//! Atomic CSS engine.
//!
//! Style objects are split into one rule per declaration, named after a
//! fingerprint of the canonical declaration text, and written once into one of
//! six cascade layers:
//!
//! ```text
//! @media all{ keyframes }
//! @media all{ reset }
//! @media all{ atomic }
//! @media (hover: hover){ hover }
//! @media all{ focus }
//! @media all{ active }
//! ```
//!
//! `cx` merges generated classes so that the last class per CSS property wins.

/// Report a recoverable problem: `warn!` with diagnostics on, `debug!` otherwise
macro_rules! diagnostic {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            ::tracing::warn!($($arg)+);
        } else {
            ::tracing::debug!($($arg)+);
        }
    };
}

pub mod color;
pub mod css;
pub mod cx;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod options;
pub mod preprocess;
pub mod sheet;
pub mod style;

pub use color::{format_color, ColorResolver, CssColorResolver};
pub use css::{Css, MakeInput};
pub use cx::{ClassNames, Composer, IdentityCaches};
pub use error::{EngineError, EngineResult, HostError};
pub use fingerprint::fingerprint;
pub use normalize::Normalizer;
pub use options::EngineOptions;
pub use preprocess::AtomicStyle;
pub use sheet::{Layer, SheetBackend, SheetHost, StyleEngine, VirtualDocument, VirtualSheet};
pub use style::{ClassMap, FlatStyle, KeyframeBlocks, Keyframes, PseudoState, Style, StyleEntry, StyleMap, StyleValue};
