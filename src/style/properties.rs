//! Property maps and property value variants.

use crate::geometry::Geometry;
use crate::style::store::{StyleHandle, StyleStore};
use std::collections::HashMap;

/// Well-known property keys.
///
/// The format stores properties as named elements inside a property map;
/// these constants are the normalized key names used across all parsers.
pub mod props {
    pub const ALIGNMENT: &str = "alignment";
    pub const BASELINE: &str = "baseline";
    pub const BOLD: &str = "bold";
    pub const CAPITALIZATION: &str = "capitalization";
    pub const FONT_COLOR: &str = "fontColor";
    pub const FONT_NAME: &str = "fontName";
    pub const FONT_SIZE: &str = "fontSize";
    pub const GEOMETRY: &str = "geometry";
    pub const ITALIC: &str = "italic";
    pub const LINE_SPACING: &str = "lineSpacing";
    pub const OUTLINE: &str = "outline";
    pub const PARAGRAPH_FILL: &str = "paragraphFill";
    pub const STRIKETHRU: &str = "strikethru";
    pub const TAB_STOPS: &str = "tabs";
    pub const UNDERLINE: &str = "underline";
}

/// An RGBA color; components are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
    Justify,
}

/// Character baseline shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Normal,
    Subscript,
    Superscript,
}

/// Character capitalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capitalization {
    None,
    AllCaps,
    SmallCaps,
    Title,
}

/// A tabulator stop position, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabStop {
    pub position: f64,
}

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Color(Color),
    Geometry(Geometry),
    TabStops(Vec<TabStop>),
    /// A nested style, stored by handle.
    Style(StyleHandle),
    Alignment(Alignment),
    Baseline(Baseline),
    Capitalization(Capitalization),
}

/// A string-keyed property bag with an optional parent.
///
/// The parent pointer is a style handle resolved at link time; lookups with
/// `look_in_parent` walk the chain through the owning [`StyleStore`].
/// Re-pointing or clearing the parent changes lookup results immediately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    values: HashMap<String, PropertyValue>,
    parent: Option<StyleHandle>,
}

impl PropertyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any existing value.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Number of locally stored properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map stores no local properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-point (or clear) the parent used for inherited lookups.
    pub fn set_parent(&mut self, parent: Option<StyleHandle>) {
        self.parent = parent;
    }

    /// The current parent, if any.
    pub fn parent(&self) -> Option<StyleHandle> {
        self.parent
    }

    /// Look up a property.
    ///
    /// Checks the local map first; when `look_in_parent` is set and the key
    /// is absent, recurses through the resolved parent chain.
    pub fn get<'a>(
        &'a self,
        key: &str,
        look_in_parent: bool,
        store: &'a StyleStore,
    ) -> Option<&'a PropertyValue> {
        if let Some(value) = self.values.get(key) {
            return Some(value);
        }
        if look_in_parent
            && let Some(parent) = self.parent
            && let Some(parent_style) = store.get(parent)
        {
            return parent_style.properties().get(key, true, store);
        }
        None
    }
}
