//! The style arena and the deferred parent-linking protocol.

use super::StyleKind;
use super::properties::{PropertyMap, PropertyValue};
use super::sheet::{StylesheetHandle, StylesheetStore};
use tracing::debug;

/// Index of a style inside the document's [`StyleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(u32);

/// A single style: a property bag plus its inheritance bookkeeping.
///
/// A freshly constructed style with a `parent_ident` is *unlinked*; it
/// becomes *linked* once [`StyleStore::link`] has resolved the parent
/// (possibly to nothing, when the lookup misses). A style without a
/// `parent_ident` is trivially linked from the start.
#[derive(Debug, Clone)]
pub struct Style {
    kind: StyleKind,
    ident: Option<String>,
    parent_ident: Option<String>,
    props: PropertyMap,
    parent: Option<StyleHandle>,
    linked: bool,
}

impl Style {
    /// Create a style from parsed parts.
    pub fn new(
        kind: StyleKind,
        props: PropertyMap,
        ident: Option<String>,
        parent_ident: Option<String>,
    ) -> Self {
        let linked = parent_ident.is_none();
        Self {
            kind,
            ident,
            parent_ident,
            props,
            parent: None,
            linked,
        }
    }

    /// The style's category.
    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    /// The stylesheet-relative name, if the style is named.
    pub fn ident(&self) -> Option<&str> {
        self.ident.as_deref()
    }

    /// The name of the style to inherit from, if any.
    pub fn parent_ident(&self) -> Option<&str> {
        self.parent_ident.as_deref()
    }

    /// The resolved parent, once linked.
    pub fn parent(&self) -> Option<StyleHandle> {
        self.parent
    }

    /// Whether parent resolution has completed.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// The underlying property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.props
    }

    /// Mutable access to the property map.
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.props
    }

    /// Convenience lookup through the owning store.
    pub fn get<'a>(
        &'a self,
        key: &str,
        look_in_parent: bool,
        store: &'a StyleStore,
    ) -> Option<&'a PropertyValue> {
        self.props.get(key, look_in_parent, store)
    }
}

/// Arena of all styles in a document.
///
/// The store is the sole owner; every other part of the pipeline refers to
/// styles by [`StyleHandle`]. Lifetime of all styles equals the document's.
#[derive(Debug, Default)]
pub struct StyleStore {
    styles: Vec<Style>,
}

impl StyleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a style into the arena and return its handle.
    pub fn insert(&mut self, style: Style) -> StyleHandle {
        let handle = StyleHandle(self.styles.len() as u32);
        self.styles.push(style);
        handle
    }

    /// Fetch a style by handle.
    pub fn get(&self, handle: StyleHandle) -> Option<&Style> {
        self.styles.get(handle.0 as usize)
    }

    /// Fetch a style mutably by handle.
    pub fn get_mut(&mut self, handle: StyleHandle) -> Option<&mut Style> {
        self.styles.get_mut(handle.0 as usize)
    }

    /// Number of styles in the arena.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve a style's parent against a stylesheet.
    ///
    /// Idempotent: once a style is linked, further calls do nothing and
    /// report success. A style whose `ident` equals its own `parent_ident`
    /// searches the *parent* stylesheet: a same-named override refers to
    /// the style it shadows, never to itself.
    ///
    /// Returns whether the style ends up with a resolved parent (or had no
    /// parent to resolve).
    pub fn link(
        &mut self,
        handle: StyleHandle,
        stylesheet: Option<StylesheetHandle>,
        sheets: &StylesheetStore,
    ) -> bool {
        let Some(style) = self.styles.get(handle.0 as usize) else {
            return false;
        };
        if style.linked {
            return true;
        }
        let Some(parent_ident) = style.parent_ident.clone() else {
            self.styles[handle.0 as usize].linked = true;
            return true;
        };

        let search_root = if style.ident.as_deref() == Some(parent_ident.as_str()) {
            stylesheet.and_then(|sheet| sheets.get(sheet).and_then(|s| s.parent()))
        } else {
            stylesheet
        };
        let Some(root) = search_root else {
            // Stays unlinked; a later pass may supply a stylesheet.
            return false;
        };

        let kind = style.kind;
        match sheets.find(root, kind, &parent_ident) {
            Some(parent) => {
                let style = &mut self.styles[handle.0 as usize];
                style.parent = Some(parent);
                style.props.set_parent(Some(parent));
                style.linked = true;
                true
            },
            None => {
                debug!(
                    kind = kind.as_str(),
                    parent = parent_ident.as_str(),
                    "style parent not found"
                );
                self.styles[handle.0 as usize].linked = true;
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::properties::props;

    fn named_style(kind: StyleKind, ident: &str, parent: Option<&str>) -> Style {
        Style::new(
            kind,
            PropertyMap::new(),
            Some(ident.to_string()),
            parent.map(str::to_string),
        )
    }

    #[test]
    fn test_style_without_parent_is_immediately_linked() {
        let style = Style::new(StyleKind::Graphic, PropertyMap::new(), None, None);
        assert!(style.is_linked());
    }

    #[test]
    fn test_link_resolves_parent_chain() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        let mut props_c = PropertyMap::new();
        props_c.set(props::FONT_SIZE, PropertyValue::Number(42.0));
        let c = styles.insert(Style::new(
            StyleKind::Paragraph,
            props_c,
            Some("c".to_string()),
            None,
        ));
        let b = styles.insert(named_style(StyleKind::Paragraph, "b", Some("c")));
        let a = styles.insert(named_style(StyleKind::Paragraph, "a", Some("b")));

        let mut sheet = super::super::sheet::Stylesheet::new(None);
        sheet.insert(StyleKind::Paragraph, "a", a);
        sheet.insert(StyleKind::Paragraph, "b", b);
        sheet.insert(StyleKind::Paragraph, "c", c);
        let sheet = sheets.insert(sheet);

        assert!(styles.link(a, Some(sheet), &sheets));
        assert!(styles.link(b, Some(sheet), &sheets));
        assert!(styles.link(c, Some(sheet), &sheets));

        // A property defined only on the grandparent is visible with
        // parent lookup, invisible without.
        let a_style = styles.get(a).unwrap();
        assert_eq!(
            a_style.get(props::FONT_SIZE, true, &styles),
            Some(&PropertyValue::Number(42.0))
        );
        assert_eq!(a_style.get(props::FONT_SIZE, false, &styles), None);
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        let parent = styles.insert(named_style(StyleKind::Graphic, "base", None));
        let child = styles.insert(named_style(StyleKind::Graphic, "child", Some("base")));

        let mut sheet = super::super::sheet::Stylesheet::new(None);
        sheet.insert(StyleKind::Graphic, "base", parent);
        sheet.insert(StyleKind::Graphic, "child", child);
        let sheet = sheets.insert(sheet);

        assert!(styles.link(child, Some(sheet), &sheets));
        let resolved = styles.get(child).unwrap().parent();
        assert!(styles.link(child, Some(sheet), &sheets));
        assert_eq!(styles.get(child).unwrap().parent(), resolved);
    }

    #[test]
    fn test_self_reference_escapes_to_parent_stylesheet() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        // Stylesheet B (the parent) defines "s" with the answer.
        let mut props_b = PropertyMap::new();
        props_b.set(props::FONT_SIZE, PropertyValue::Number(42.0));
        let s_in_b = styles.insert(Style::new(
            StyleKind::Character,
            props_b,
            Some("s".to_string()),
            None,
        ));
        let mut sheet_b = super::super::sheet::Stylesheet::new(None);
        sheet_b.insert(StyleKind::Character, "s", s_in_b);
        let sheet_b = sheets.insert(sheet_b);

        // Stylesheet A overrides "s" with parent "s", a self-reference.
        let s_in_a = styles.insert(named_style(StyleKind::Character, "s", Some("s")));
        let mut sheet_a = super::super::sheet::Stylesheet::new(Some(sheet_b));
        sheet_a.insert(StyleKind::Character, "s", s_in_a);
        let sheet_a = sheets.insert(sheet_a);

        assert!(styles.link(s_in_a, Some(sheet_a), &sheets));
        let style = styles.get(s_in_a).unwrap();
        // Resolved to B's style, not to itself.
        assert_eq!(style.parent(), Some(s_in_b));
        assert_eq!(
            style.get(props::FONT_SIZE, true, &styles),
            Some(&PropertyValue::Number(42.0))
        );
    }

    #[test]
    fn test_self_reference_without_parent_sheet_stays_unlinked() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        let s = styles.insert(named_style(StyleKind::Character, "s", Some("s")));
        let mut sheet = super::super::sheet::Stylesheet::new(None);
        sheet.insert(StyleKind::Character, "s", s);
        let sheet = sheets.insert(sheet);

        assert!(!styles.link(s, Some(sheet), &sheets));
        assert!(!styles.get(s).unwrap().is_linked());
    }

    #[test]
    fn test_dangling_parent_marks_linked_without_parent() {
        let mut styles = StyleStore::new();
        let mut sheets = StylesheetStore::new();

        let orphan = styles.insert(named_style(StyleKind::Graphic, "x", Some("missing")));
        let sheet = sheets.insert(super::super::sheet::Stylesheet::new(None));

        assert!(!styles.link(orphan, Some(sheet), &sheets));
        let style = styles.get(orphan).unwrap();
        assert!(style.is_linked());
        assert_eq!(style.parent(), None);
    }
}
