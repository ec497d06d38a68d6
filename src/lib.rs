//! Longan - A Rust library for importing legacy Apple iWork file formats
//!
//! This library reads the XML-based iWork generations (Keynote '05-'09,
//! Pages '05-'09, Numbers '08-'09) and replays slide, text, and
//! spreadsheet content into a caller-supplied [`DocumentSink`].
//!
//! # Features
//!
//! - **Format detection**: bundle directories, ZIP packages, and bare
//!   (optionally gzipped) main streams
//! - **Two-pass import**: a theme pass harvests master styles and
//!   placeholders, a content pass resolves slides against them
//! - **Style resolution**: hierarchical stylesheets with deferred parent
//!   linking and contextual lookup
//! - **Streaming output**: the sole output is an ordered sequence of sink
//!   events; no intermediate document model is exposed
//!
//! # Example - Extracting slide text
//!
//! ```no_run
//! use longan::{Document, DocumentSink};
//!
//! #[derive(Default)]
//! struct TextSink {
//!     text: String,
//! }
//!
//! impl DocumentSink for TextSink {
//!     fn insert_text(&mut self, text: &str) {
//!         self.text.push_str(text);
//!     }
//!
//!     fn close_paragraph(&mut self) {
//!         self.text.push('\n');
//!     }
//! }
//!
//! # fn main() -> Result<(), longan::Error> {
//! let document = Document::open("slideshow.key")?;
//! let mut sink = TextSink::default();
//! document.parse(&mut sink)?;
//! println!("{}", sink.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Checking a file before conversion
//!
//! ```no_run
//! use longan::Document;
//!
//! if Document::is_supported("report.pages") {
//!     println!("supported");
//! }
//! ```

/// The scene builder driven by the format parsers.
pub mod collector;
/// Common types: errors, identifiers, format detection.
pub mod common;
/// Spreadsheet formula parsing and rendering.
pub mod formula;
/// Geometry value types, affine transforms, and vector paths.
pub mod geometry;
/// Keynote (APXL) parsing.
pub mod keynote;
/// Numbers parsing.
pub mod numbers;
/// Container access (bundle directory, ZIP, bare stream).
pub mod package;
/// Pages parsing.
pub mod pages;
/// Parsers for the shared `sf` vocabulary.
pub mod sf;
/// The output event-sink contract.
pub mod sink;
/// Styles, stylesheets, and contextual resolution.
pub mod style;
/// Shared XML plumbing.
pub mod xml;

mod document;

// Re-export commonly used types for convenience
pub use common::{Error, Format, Result, SourceKind, Version};
pub use document::Document;
pub use sink::{DocumentSink, NullSink};
