//! Version-specific default values for Keynote documents.

use crate::collector::Defaults;
use crate::common::detection::Version;
use crate::geometry::Size;

/// Defaults shared by all APXL versions, parameterized by slide size.
#[derive(Debug)]
pub struct KeynoteDefaults {
    width: f64,
    height: f64,
}

impl Defaults for KeynoteDefaults {
    fn presentation_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

static KEYNOTE2: KeynoteDefaults = KeynoteDefaults {
    width: 800.0,
    height: 600.0,
};
static KEYNOTE_MODERN: KeynoteDefaults = KeynoteDefaults {
    width: 1024.0,
    height: 768.0,
};

/// The defaults strategy for a Keynote version.
pub fn defaults_for(version: Version) -> &'static dyn Defaults {
    match version {
        Version::Keynote2 => &KEYNOTE2,
        _ => &KEYNOTE_MODERN,
    }
}
