//! Dynamic style context.
//!
//! Some properties are not stored on the object being drawn but depend on
//! the drawing scope it appears in; a placeholder's geometry, for example,
//! comes from whichever master-slide style is active at draw time. The
//! context is an explicit stack of active styles; a lookup scans from the
//! innermost scope outward and returns the first match.

use super::properties::PropertyValue;
use super::store::{StyleHandle, StyleStore};

/// A stack of currently-active styles, innermost last.
#[derive(Debug, Clone, Default)]
pub struct StyleContext {
    stack: Vec<StyleHandle>,
}

impl StyleContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a drawing scope governed by `style`.
    pub fn push(&mut self, style: StyleHandle) {
        self.stack.push(style);
    }

    /// Leave the innermost scope.
    pub fn pop(&mut self) {
        debug_assert!(!self.stack.is_empty(), "style context underflow");
        self.stack.pop();
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Find a property in the context, innermost scope first.
    ///
    /// Each consulted style may defer to its own linked parents before the
    /// scan moves outward.
    pub fn find<'a>(&self, key: &str, store: &'a StyleStore) -> Option<&'a PropertyValue> {
        for &handle in self.stack.iter().rev() {
            if let Some(style) = store.get(handle)
                && let Some(value) = style.get(key, true, store)
            {
                return Some(value);
            }
        }
        None
    }
}

/// Look up a property on a style, falling back to the dynamic context.
///
/// This is the resolution order used during drawing: the object's own style
/// (with inheritance), then the innermost-first context scan.
pub fn resolve_property<'a>(
    key: &str,
    own: Option<StyleHandle>,
    store: &'a StyleStore,
    context: &StyleContext,
) -> Option<&'a PropertyValue> {
    if let Some(own) = own
        && let Some(style) = store.get(own)
        && let Some(value) = style.get(key, true, store)
    {
        return Some(value);
    }
    context.find(key, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleKind;
    use crate::style::properties::{PropertyMap, props};
    use crate::style::store::Style;

    fn style_with(store: &mut StyleStore, key: &str, value: f64) -> StyleHandle {
        let mut props = PropertyMap::new();
        props.set(key, PropertyValue::Number(value));
        store.insert(Style::new(StyleKind::Placeholder, props, None, None))
    }

    #[test]
    fn test_innermost_match_wins() {
        let mut store = StyleStore::new();
        let outer = style_with(&mut store, props::FONT_SIZE, 10.0);
        let inner = style_with(&mut store, props::FONT_SIZE, 24.0);

        let mut context = StyleContext::new();
        context.push(outer);
        context.push(inner);
        assert_eq!(
            context.find(props::FONT_SIZE, &store),
            Some(&PropertyValue::Number(24.0))
        );

        context.pop();
        assert_eq!(
            context.find(props::FONT_SIZE, &store),
            Some(&PropertyValue::Number(10.0))
        );
    }

    #[test]
    fn test_scan_skips_styles_without_the_key() {
        let mut store = StyleStore::new();
        let outer = style_with(&mut store, props::FONT_SIZE, 10.0);
        let inner = style_with(&mut store, props::LINE_SPACING, 1.5);

        let mut context = StyleContext::new();
        context.push(outer);
        context.push(inner);
        assert_eq!(
            context.find(props::FONT_SIZE, &store),
            Some(&PropertyValue::Number(10.0))
        );
    }

    #[test]
    fn test_own_style_beats_context() {
        let mut store = StyleStore::new();
        let own = style_with(&mut store, props::FONT_SIZE, 30.0);
        let active = style_with(&mut store, props::FONT_SIZE, 12.0);

        let mut context = StyleContext::new();
        context.push(active);
        assert_eq!(
            resolve_property(props::FONT_SIZE, Some(own), &store, &context),
            Some(&PropertyValue::Number(30.0))
        );
        assert_eq!(
            resolve_property(props::FONT_SIZE, None, &store, &context),
            Some(&PropertyValue::Number(12.0))
        );
    }
}
