//! The document dictionary: sole owner of every referenceable entity.
//!
//! All cross-references inside a document go through identifiers; the
//! dictionary maps them to arena handles (styles, stylesheets) or to the
//! values themselves (paths, media data, placeholders, master pages). It is
//! populated during the theme pass and extended during the content pass;
//! both passes share the same instance.

use crate::collector::object::{Page, Placeholder};
use crate::common::Id;
use crate::geometry::{Path, Size};
use crate::style::{StyleHandle, StyleKind, StyleStore, StylesheetHandle, StylesheetStore};
use std::collections::HashMap;
use tracing::warn;

/// Document-scoped registry of referenceable entities.
#[derive(Debug, Default)]
pub struct Dictionary {
    /// Arena of all styles.
    pub styles: StyleStore,
    /// Arena of all stylesheets.
    pub stylesheets: StylesheetStore,
    /// Per-kind style registry.
    style_ids: HashMap<(StyleKind, Id), StyleHandle>,
    /// Stylesheet registry.
    pub stylesheet_ids: HashMap<Id, StylesheetHandle>,
    /// Registered bezier paths.
    pub beziers: HashMap<Id, Path>,
    /// Registered media data, as package-relative paths.
    pub data: HashMap<Id, String>,
    /// Title placeholders, masters and slides alike.
    pub title_placeholders: HashMap<Id, Placeholder>,
    /// Body placeholders, masters and slides alike.
    pub body_placeholders: HashMap<Id, Placeholder>,
    /// Master pages harvested by the theme pass.
    pub masters: HashMap<Id, Page>,
    /// Presentation size, if the theme declared one.
    pub presentation_size: Option<Size>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style under its identifier.
    pub fn register_style(&mut self, kind: StyleKind, id: Id, handle: StyleHandle) {
        self.style_ids.insert((kind, id), handle);
    }

    /// Resolve a style reference.
    ///
    /// A miss is a soft failure: it is logged and the caller proceeds
    /// without a style.
    pub fn find_style(&self, kind: StyleKind, id: &Id) -> Option<StyleHandle> {
        let found = self.style_ids.get(&(kind, id.clone())).copied();
        if found.is_none() {
            warn!(
                kind = kind.as_str(),
                id = id.as_str(),
                "dangling style reference"
            );
        }
        found
    }

    /// Resolve a placeholder reference from the title or body registry.
    pub fn find_placeholder(&self, id: &Id, title: bool) -> Option<&Placeholder> {
        let registry = if title {
            &self.title_placeholders
        } else {
            &self.body_placeholders
        };
        let found = registry.get(id.as_str());
        if found.is_none() {
            warn!(id = id.as_str(), title, "dangling placeholder reference");
        }
        found
    }

    /// Resolve a registered bezier path.
    pub fn find_bezier(&self, id: &Id) -> Option<&Path> {
        let found = self.beziers.get(id.as_str());
        if found.is_none() {
            warn!(id = id.as_str(), "dangling bezier reference");
        }
        found
    }

    /// Resolve a stylesheet reference.
    pub fn find_stylesheet(&self, id: &Id) -> Option<StylesheetHandle> {
        let found = self.stylesheet_ids.get(id.as_str()).copied();
        if found.is_none() {
            warn!(id = id.as_str(), "dangling stylesheet reference");
        }
        found
    }
}
