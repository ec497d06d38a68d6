//! Document-scoped identifiers.
//!
//! Every referenceable entity in an iWork document (style, geometry, data
//! blob, placeholder, bezier) is registered under an opaque string key that
//! is unique within one document. References elsewhere in the document
//! resolve by dictionary lookup against that key. A style's human-readable
//! `ident` is a different, stylesheet-relative name and is not an [`Id`].

use std::borrow::Borrow;
use std::fmt;

/// An opaque per-document identifier.
///
/// Dangling references (an [`Id`] that was never registered) are a soft
/// failure everywhere in the pipeline: the lookup logs a diagnostic and
/// yields a default value, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    /// Create an identifier from a raw attribute value.
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Id {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_id_lookup_by_str() {
        let mut map: HashMap<Id, u32> = HashMap::new();
        map.insert(Id::new("SFWPFrame-1"), 7);
        // Borrow<str> lets dictionaries be probed without allocating.
        assert_eq!(map.get("SFWPFrame-1"), Some(&7));
        assert_eq!(map.get("missing"), None);
    }
}
