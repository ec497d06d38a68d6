//! Pages ('05–'09) import.

mod defaults;
mod parser;

pub use defaults::defaults_for;
pub use parser::parse_document;
