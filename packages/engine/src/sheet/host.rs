use super::rule::CssRule;
use crate::error::HostError;

/// A mutable style sheet: the rule-insertion primitives the engine relies on
pub trait SheetBackend {
    /// Snapshot of the top-level rules, nested rules included
    fn rules(&self) -> Vec<CssRule>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a top-level rule at `index`
    fn insert_rule(&mut self, rule: &str, index: usize) -> Result<(), HostError>;

    /// Append a rule to the `@media` block found at `parent`
    fn insert_nested_rule(&mut self, parent: usize, rule: &str) -> Result<(), HostError>;
}

/// Locates or creates sheet containers by id
pub trait SheetHost {
    fn find_or_create(&mut self, id: &str) -> Result<Box<dyn SheetBackend>, HostError>;
}
