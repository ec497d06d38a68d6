//! Default values for Pages documents.

use crate::collector::Defaults;
use crate::common::detection::Version;
use crate::geometry::Size;

#[derive(Debug)]
pub struct PagesDefaults;

impl Defaults for PagesDefaults {
    /// US Letter in points.
    fn presentation_size(&self) -> Size {
        Size::new(612.0, 792.0)
    }
}

static PAGES: PagesDefaults = PagesDefaults;

pub fn defaults_for(_version: Version) -> &'static dyn Defaults {
    &PAGES
}
