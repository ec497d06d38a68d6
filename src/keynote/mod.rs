//! Keynote (APXL, versions 2 through 5) import.

mod defaults;
mod parser;

pub use defaults::defaults_for;
pub use parser::parse_document;
