//! The output event sink.
//!
//! The import filter's sole externally observable effect is the ordered
//! sequence of calls it makes on a [`DocumentSink`]. The interface mirrors
//! a generic presentation/text/spreadsheet model: bracketed document,
//! slide, layer, group, text-object, and table scopes, plus draw calls for
//! already-transformed vector content. All methods have empty default
//! bodies so a consumer only implements what it cares about.

use crate::geometry::{Path, Size};
use crate::style::{Alignment, Baseline, Capitalization, Color};

/// An axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Resolved character formatting delivered with each span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethru: Option<bool>,
    pub outline: Option<bool>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<Color>,
    pub baseline: Option<Baseline>,
    pub capitalization: Option<Capitalization>,
}

/// Resolved paragraph formatting delivered with each paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<f64>,
    pub fill: Option<Color>,
    pub tab_stops: Vec<f64>,
}

/// A generated text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The current slide/page number.
    SlideNumber,
}

/// Receiver for the normalized event stream produced by the content pass.
#[allow(unused_variables)]
pub trait DocumentSink {
    fn start_document(&mut self, size: Size) {}
    fn end_document(&mut self) {}

    fn start_slide(&mut self, index: usize, name: Option<&str>) {}
    fn end_slide(&mut self) {}

    fn start_layer(&mut self) {}
    fn end_layer(&mut self) {}

    fn start_group(&mut self) {}
    fn end_group(&mut self) {}

    /// A vector path, already transformed to document coordinates.
    fn draw_path(&mut self, path: &Path) {}
    /// A straight connector or free line.
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {}
    /// An embedded image or movie poster frame; `data` is the
    /// package-relative path of the media data.
    fn draw_graphic_object(&mut self, bounds: Rect, data: Option<&str>) {}
    /// A connector path between two objects.
    fn draw_connector(&mut self, path: &Path) {}

    fn start_text_object(&mut self, bounds: Rect) {}
    fn end_text_object(&mut self) {}

    fn open_paragraph(&mut self, format: &ParagraphFormat) {}
    fn close_paragraph(&mut self) {}
    fn open_span(&mut self, format: &SpanFormat) {}
    fn close_span(&mut self) {}

    fn insert_text(&mut self, text: &str) {}
    fn insert_tab(&mut self) {}
    fn insert_line_break(&mut self) {}
    fn insert_field(&mut self, kind: FieldKind) {}

    fn open_unordered_list(&mut self) {}
    fn close_unordered_list(&mut self) {}
    fn open_list_element(&mut self) {}
    fn close_list_element(&mut self) {}

    fn open_table(&mut self, bounds: Rect, column_sizes: &[f64]) {}
    fn close_table(&mut self) {}
    fn open_table_row(&mut self, height: f64) {}
    fn close_table_row(&mut self) {}
    fn open_table_cell(&mut self, column_span: usize, row_span: usize) {}
    fn close_table_cell(&mut self) {}
    fn insert_covered_table_cell(&mut self) {}

    /// Presenter notes attached to the current slide.
    fn start_notes(&mut self) {}
    fn end_notes(&mut self) {}

    /// A sticky-note comment attached to the current slide.
    fn open_comment(&mut self) {}
    fn close_comment(&mut self) {}
}

/// A sink that ignores everything. Used by the theme pass and as a default
/// collaborator in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl DocumentSink for NullSink {}
