use crate::style::PseudoState;

/// Cascade layers, in sheet order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Keyframes,
    Reset,
    Atomic,
    Hover,
    Focus,
    Active,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Keyframes,
        Layer::Reset,
        Layer::Atomic,
        Layer::Hover,
        Layer::Focus,
        Layer::Active,
    ];

    /// Position of the layer's media wrapper in the sheet
    pub fn index(self) -> usize {
        self as usize
    }

    /// Generated name prefix
    pub fn prefix(self) -> &'static str {
        match self {
            Layer::Keyframes => "k",
            Layer::Reset => "r",
            Layer::Atomic => "x",
            Layer::Hover => "h",
            Layer::Focus => "f",
            Layer::Active => "a",
        }
    }

    /// Condition of the wrapping `@media` block
    pub fn media(self) -> &'static str {
        match self {
            Layer::Hover => "(hover: hover)",
            _ => "all",
        }
    }

    pub fn selector_suffix(self) -> &'static str {
        match self {
            Layer::Hover => ":hover",
            Layer::Focus => ":focus-visible",
            Layer::Active => ":active",
            _ => "",
        }
    }

    /// Empty wrapper rule text, e.g. `@media all{}`
    pub fn wrapper(self) -> String {
        format!("@media {}{{}}", self.media())
    }
}

impl From<PseudoState> for Layer {
    fn from(state: PseudoState) -> Self {
        match state {
            PseudoState::Hover => Layer::Hover,
            PseudoState::Focus => Layer::Focus,
            PseudoState::Active => Layer::Active,
        }
    }
}
