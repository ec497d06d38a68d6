//! Default values for Numbers documents.

use crate::collector::Defaults;
use crate::common::detection::Version;
use crate::geometry::Size;

#[derive(Debug)]
pub struct NumbersDefaults;

impl Defaults for NumbersDefaults {
    fn presentation_size(&self) -> Size {
        Size::new(1024.0, 768.0)
    }
}

static NUMBERS: NumbersDefaults = NumbersDefaults;

pub fn defaults_for(_version: Version) -> &'static dyn Defaults {
    &NUMBERS
}
