//! Stylesheets: named per-kind style tables with single-parent nesting.

use super::StyleKind;
use super::store::StyleHandle;
use std::collections::HashMap;

/// Index of a stylesheet inside the document's [`StylesheetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StylesheetHandle(u32);

/// A collection of named styles, one namespace per style kind, plus an
/// optional parent stylesheet.
///
/// Stylesheets nest the way the document nests: the theme stylesheet is the
/// parent of a master slide's stylesheet, which is the parent of a slide's.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    parent: Option<StylesheetHandle>,
    styles: HashMap<(StyleKind, String), StyleHandle>,
}

impl Stylesheet {
    /// Create an empty stylesheet with an optional parent.
    pub fn new(parent: Option<StylesheetHandle>) -> Self {
        Self {
            parent,
            styles: HashMap::new(),
        }
    }

    /// The parent stylesheet, if any.
    pub fn parent(&self) -> Option<StylesheetHandle> {
        self.parent
    }

    /// Re-point the parent (used when the parent reference is parsed after
    /// the first styles).
    pub fn set_parent(&mut self, parent: Option<StylesheetHandle>) {
        self.parent = parent;
    }

    /// Register a named style. A later style with the same kind and ident
    /// replaces the earlier one.
    pub fn insert(&mut self, kind: StyleKind, ident: &str, handle: StyleHandle) {
        self.styles.insert((kind, ident.to_string()), handle);
    }

    /// Look up a named style in this stylesheet only.
    pub fn find_local(&self, kind: StyleKind, ident: &str) -> Option<StyleHandle> {
        self.styles.get(&(kind, ident.to_string())).copied()
    }

    /// Whether the stylesheet holds no styles.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Arena of all stylesheets in a document.
#[derive(Debug, Default)]
pub struct StylesheetStore {
    sheets: Vec<Stylesheet>,
}

impl StylesheetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a stylesheet into the arena and return its handle.
    pub fn insert(&mut self, sheet: Stylesheet) -> StylesheetHandle {
        let handle = StylesheetHandle(self.sheets.len() as u32);
        self.sheets.push(sheet);
        handle
    }

    /// Fetch a stylesheet by handle.
    pub fn get(&self, handle: StylesheetHandle) -> Option<&Stylesheet> {
        self.sheets.get(handle.0 as usize)
    }

    /// Look up a named style, walking up the stylesheet-parent chain.
    pub fn find(
        &self,
        sheet: StylesheetHandle,
        kind: StyleKind,
        ident: &str,
    ) -> Option<StyleHandle> {
        let mut current = Some(sheet);
        while let Some(handle) = current {
            let sheet = self.get(handle)?;
            if let Some(style) = sheet.find_local(kind, ident) {
                return Some(style);
            }
            current = sheet.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::properties::PropertyMap;
    use crate::style::store::{Style, StyleStore};

    #[test]
    fn test_find_walks_parent_chain() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        let base = styles.insert(Style::new(
            StyleKind::Graphic,
            PropertyMap::new(),
            Some("base".to_string()),
            None,
        ));

        let mut theme = Stylesheet::new(None);
        theme.insert(StyleKind::Graphic, "base", base);
        let theme = sheets.insert(theme);
        let slide = sheets.insert(Stylesheet::new(Some(theme)));

        assert_eq!(sheets.find(slide, StyleKind::Graphic, "base"), Some(base));
        // The kind namespaces are separate.
        assert_eq!(sheets.find(slide, StyleKind::Character, "base"), None);
        assert_eq!(sheets.find(slide, StyleKind::Graphic, "missing"), None);
    }
}
