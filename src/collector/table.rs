//! Collected tables: a sparse cell grid behind a moving cursor.

use crate::collector::dictionary::Dictionary;
use crate::collector::object::Output;
use crate::collector::text::Text;
use crate::formula::Formula;
use crate::geometry::Geometry;
use crate::sink::{DocumentSink, ParagraphFormat, Rect, SpanFormat};
use crate::style::StyleHandle;
use std::collections::{BTreeMap, BTreeSet};

/// What a cell holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Rich text.
    Text(Text),
    /// A plain scalar value, kept in its source form.
    Value(String),
    /// A parsed formula.
    Formula(Formula),
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Option<CellContent>,
    pub style: Option<StyleHandle>,
    pub column_span: usize,
    pub row_span: usize,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: None,
            style: None,
            column_span: 1,
            row_span: 1,
        }
    }
}

/// A table under construction and, once collected, a drawable.
///
/// Cells are placed by a cursor that advances left to right and wraps to
/// the next row at the last column. The format can also move the cursor
/// explicitly ("cell move"), skipping cells that stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub column_sizes: Vec<f64>,
    pub row_sizes: Vec<f64>,
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    cells: BTreeMap<(usize, usize), Cell>,
    covered: BTreeSet<(usize, usize)>,
    cursor_row: usize,
    cursor_column: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any structure has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.column_sizes.is_empty() && self.row_sizes.is_empty()
    }

    /// Set the column and row sizes. Must be known before cells arrive for
    /// row-wrap to work; the parsers guarantee this order.
    pub fn set_sizes(&mut self, column_sizes: Vec<f64>, row_sizes: Vec<f64>) {
        self.column_sizes = column_sizes;
        self.row_sizes = row_sizes;
    }

    /// Number of columns, as far as known.
    pub fn column_count(&self) -> usize {
        self.column_sizes.len()
    }

    /// Number of rows, preferring the declared sizes over cell extent.
    pub fn row_count(&self) -> usize {
        let from_cells = self
            .cells
            .keys()
            .chain(self.covered.iter())
            .map(|&(row, _)| row + 1)
            .max()
            .unwrap_or(0);
        self.row_sizes.len().max(from_cells)
    }

    /// The current cursor, for tests and diagnostics.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_column)
    }

    /// Fetch a cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Place a cell at the cursor and advance past it.
    pub fn insert_cell(&mut self, cell: Cell) {
        let row = self.cursor_row;
        let column = self.cursor_column;
        let column_span = cell.column_span.max(1);
        let row_span = cell.row_span.max(1);

        // Spanned positions become covered cells.
        for r in row..row + row_span {
            for c in column..column + column_span {
                if (r, c) != (row, column) {
                    self.covered.insert((r, c));
                }
            }
        }
        self.cells.insert((row, column), cell);
        self.advance(column_span);
    }

    /// Mark the cursor position as covered by an earlier span and advance.
    pub fn insert_covered_cell(&mut self) {
        self.covered.insert((self.cursor_row, self.cursor_column));
        self.advance(1);
    }

    /// Skip `count` cells without placing anything.
    pub fn move_cursor(&mut self, count: usize) {
        self.advance(count);
    }

    fn advance(&mut self, count: usize) {
        let columns = self.column_count();
        if columns == 0 {
            self.cursor_column += count;
            return;
        }
        let mut flat = self.cursor_row * columns + self.cursor_column + count;
        self.cursor_row = flat / columns;
        flat %= columns;
        self.cursor_column = flat;
    }

    /// Replay the grid into the sink.
    pub fn draw(
        &self,
        bounds: Rect,
        dict: &Dictionary,
        output: &Output,
        sink: &mut dyn DocumentSink,
    ) {
        sink.open_table(bounds, &self.column_sizes);
        for row in 0..self.row_count() {
            let height = self.row_sizes.get(row).copied().unwrap_or(0.0);
            sink.open_table_row(height);
            for column in 0..self.column_count().max(1) {
                if let Some(cell) = self.cells.get(&(row, column)) {
                    sink.open_table_cell(cell.column_span.max(1), cell.row_span.max(1));
                    match &cell.content {
                        Some(CellContent::Text(text)) => text.draw(dict, output, sink),
                        Some(CellContent::Value(value)) => {
                            sink.open_paragraph(&ParagraphFormat::default());
                            sink.open_span(&SpanFormat::default());
                            sink.insert_text(value);
                            sink.close_span();
                            sink.close_paragraph();
                        },
                        Some(CellContent::Formula(formula)) => {
                            sink.open_paragraph(&ParagraphFormat::default());
                            sink.open_span(&SpanFormat::default());
                            sink.insert_text(&formula.to_string());
                            sink.close_span();
                            sink.close_paragraph();
                        },
                        None => {},
                    }
                    sink.close_table_cell();
                } else if self.covered.contains(&(row, column)) {
                    sink.insert_covered_table_cell();
                } else {
                    sink.open_table_cell(1, 1);
                    sink.close_table_cell();
                }
            }
            sink.close_table_row();
        }
        sink.close_table();
    }
}
