//! Styles, stylesheets, and contextual style resolution.
//!
//! iWork styles are named bags of properties with single-parent inheritance
//! by `ident` inside a stylesheet, and stylesheets themselves nest (theme →
//! master slide → slide). Styles are collected before their parents may
//! exist, so parent resolution is deferred to stylesheet close; see
//! [`StyleStore::link`]. All styles live in a document-scoped arena and are
//! addressed by [`StyleHandle`]; the dictionary is the sole owner, every
//! other reference is a lookup.

mod context;
mod properties;
mod sheet;
mod store;

pub use context::{StyleContext, resolve_property};
pub use properties::{
    Alignment, Baseline, Capitalization, Color, PropertyMap, PropertyValue, TabStop, props,
};
pub use sheet::{Stylesheet, StylesheetHandle, StylesheetStore};
pub use store::{Style, StyleHandle, StyleStore};

/// The style categories known to the file format.
///
/// Each kind populates its own dictionary and its own per-stylesheet lookup
/// table; parent resolution never crosses kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Character,
    Paragraph,
    Layout,
    Graphic,
    Cell,
    Vector,
    Placeholder,
    Slide,
    Tabular,
    Connection,
    List,
}

impl StyleKind {
    /// Human-readable name, used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Paragraph => "paragraph",
            Self::Layout => "layout",
            Self::Graphic => "graphic",
            Self::Cell => "cell",
            Self::Vector => "vector",
            Self::Placeholder => "placeholder",
            Self::Slide => "slide",
            Self::Tabular => "tabular",
            Self::Connection => "connection",
            Self::List => "list",
        }
    }
}
