//! In-memory CSSOM used at build time and in tests

use super::host::{SheetBackend, SheetHost};
use super::rule::{parse_rule, parse_rules, CssRule};
use crate::error::HostError;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub type SharedSheet = Rc<RefCell<VirtualSheet>>;

/// Rule list with insertion bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualSheet {
    rules: Vec<CssRule>,
    insertions: usize,
}

impl VirtualSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load pre-rendered sheet text; preloaded rules are not counted as insertions
    pub fn from_css(css: &str) -> Result<Self, HostError> {
        let rules = parse_rules(css).map_err(|reason| HostError::rejected(css, reason))?;
        Ok(Self {
            rules,
            insertions: 0,
        })
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    /// Successful `insert_rule`/`insert_nested_rule` calls so far
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// Rules nested in the `@media` block at `index`
    pub fn nested_rules(&self, index: usize) -> &[CssRule] {
        match self.rules.get(index) {
            Some(CssRule::Media { rules, .. }) => rules,
            _ => &[],
        }
    }

    pub fn to_css(&self) -> String {
        self.rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn insert(&mut self, rule: &str, index: usize) -> Result<(), HostError> {
        let parsed = parse_rule(rule).map_err(|reason| HostError::rejected(rule, reason))?;

        if index > self.rules.len() {
            return Err(HostError::IndexOutOfBounds {
                index,
                len: self.rules.len(),
            });
        }

        self.rules.insert(index, parsed);
        self.insertions += 1;
        Ok(())
    }

    pub fn insert_nested(&mut self, parent: usize, rule: &str) -> Result<(), HostError> {
        let parsed = parse_rule(rule).map_err(|reason| HostError::rejected(rule, reason))?;
        let len = self.rules.len();

        match self.rules.get_mut(parent) {
            Some(CssRule::Media { rules, .. }) => {
                rules.push(parsed);
                self.insertions += 1;
                Ok(())
            }
            Some(_) => Err(HostError::NotAMediaBlock { index: parent }),
            None => Err(HostError::IndexOutOfBounds { index: parent, len }),
        }
    }
}

impl SheetBackend for SharedSheet {
    fn rules(&self) -> Vec<CssRule> {
        self.borrow().rules.clone()
    }

    fn len(&self) -> usize {
        self.borrow().rules.len()
    }

    fn insert_rule(&mut self, rule: &str, index: usize) -> Result<(), HostError> {
        self.borrow_mut().insert(rule, index)
    }

    fn insert_nested_rule(&mut self, parent: usize, rule: &str) -> Result<(), HostError> {
        self.borrow_mut().insert_nested(parent, rule)
    }
}

/// Set of sheets addressed by id, standing in for a document's `<style>` elements
#[derive(Debug, Default)]
pub struct VirtualDocument {
    sheets: IndexMap<String, SharedSheet>,
    sealed: bool,
}

impl VirtualDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document in which no new sheet can be created
    pub fn sealed() -> Self {
        Self {
            sheets: IndexMap::new(),
            sealed: true,
        }
    }

    /// Preload a sheet from serialized text
    pub fn with_sheet(mut self, id: impl Into<String>, css: &str) -> Result<Self, HostError> {
        let sheet = VirtualSheet::from_css(css)?;
        self.sheets.insert(id.into(), Rc::new(RefCell::new(sheet)));
        Ok(self)
    }

    pub fn sheet(&self, id: &str) -> Option<SharedSheet> {
        self.sheets.get(id).cloned()
    }
}

impl SheetHost for VirtualDocument {
    fn find_or_create(&mut self, id: &str) -> Result<Box<dyn SheetBackend>, HostError> {
        if let Some(sheet) = self.sheets.get(id) {
            debug!(id = %id, "Found existing sheet");
            return Ok(Box::new(Rc::clone(sheet)));
        }

        if self.sealed {
            return Err(HostError::ContainerMissing { id: id.to_string() });
        }

        debug!(id = %id, "Creating sheet");
        let sheet: SharedSheet = Rc::new(RefCell::new(VirtualSheet::new()));
        self.sheets.insert(id.to_string(), Rc::clone(&sheet));
        Ok(Box::new(sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_nest() {
        let mut sheet = VirtualSheet::new();
        sheet.insert("@media all{}", 0).unwrap();
        sheet.insert_nested(0, ".x-a{color:#f00}").unwrap();

        assert_eq!(sheet.insertions(), 2);
        assert_eq!(sheet.nested_rules(0).len(), 1);
        assert_eq!(sheet.to_css(), "@media all{.x-a{color:#f00}}");
    }

    #[test]
    fn test_rejections_do_not_count() {
        let mut sheet = VirtualSheet::new();

        assert!(matches!(
            sheet.insert("@media all{}", 3),
            Err(HostError::IndexOutOfBounds { index: 3, len: 0 })
        ));
        sheet.insert(".x-a{color:red}", 0).unwrap();
        assert!(matches!(
            sheet.insert_nested(0, ".x-b{color:blue}"),
            Err(HostError::NotAMediaBlock { index: 0 })
        ));
        assert!(matches!(
            sheet.insert(".x-c{color}", 0),
            Err(HostError::RuleRejected { .. })
        ));
        assert_eq!(sheet.insertions(), 1);
    }

    #[test]
    fn test_document_shares_sheets() {
        let mut document = VirtualDocument::new();
        let mut backend = document.find_or_create("app").unwrap();
        backend.insert_rule("@media all{}", 0).unwrap();

        let sheet = document.sheet("app").unwrap();
        assert_eq!(sheet.borrow().rules().len(), 1);
        assert_eq!(document.find_or_create("app").unwrap().len(), 1);
    }

    #[test]
    fn test_sealed_document() {
        let mut document = VirtualDocument::sealed()
            .with_sheet("existing", "@media all{}")
            .unwrap();

        assert!(document.find_or_create("existing").is_ok());
        assert!(matches!(
            document.find_or_create("missing"),
            Err(HostError::ContainerMissing { .. })
        ));
    }
}
