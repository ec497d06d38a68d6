//! The collector: a stack-based scene builder.
//!
//! Format parsers translate the token stream into an ordered sequence of
//! `start/end` and `collect` calls; the collector turns that sequence into
//! the document dictionary plus per-layer drawable lists, and hands each
//! finished page to a [`CollectStrategy`]. The theme pass harvests master
//! pages into the dictionary; the content pass replays pages into the sink.
//! The same collector core serves both; the strategy is the only
//! difference, so neither pass can forget to override a hook.
//!
//! Structural discipline (balanced brackets, at most one in-flight text) is
//! the *parser's* responsibility: parsers skip anything they do not
//! recognize, so malformed documents never reach the collector as
//! mismatched calls. Violations here are therefore programming errors and
//! are checked with debug assertions, not runtime errors.

mod dictionary;
mod object;
mod table;
mod text;

pub use dictionary::Dictionary;
pub use object::{
    Connection, Drawable, Group, Image, Layer, Line, Media, Output, Page, Placeholder,
    PlaceholderKind, Shape,
};
pub use table::{Cell, CellContent, Table};
pub use text::{Inline, Paragraph, Text};

use crate::common::Id;
use crate::geometry::{
    self, Geometry, Path, Position, Size,
};
use crate::sink::{DocumentSink, FieldKind};
use crate::style::{PropertyMap, Style, StyleHandle, StyleKind, Stylesheet};
use smallvec::smallvec;
use tracing::{debug, warn};

/// Per-version policy for values the file may omit.
pub trait Defaults {
    /// Presentation (slide) size when the document does not declare one.
    fn presentation_size(&self) -> Size;

    /// Natural size for a geometry that omits it.
    fn natural_size(&self) -> Size {
        Size::new(100.0, 100.0)
    }

    /// Position for a geometry that omits it.
    fn position(&self) -> Position {
        Position::new(0.0, 0.0)
    }
}

/// Geometry attributes exactly as parsed, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    pub natural_size: Option<Size>,
    pub position: Option<Position>,
    pub angle: Option<f64>,
    pub shear_x_angle: Option<f64>,
    pub shear_y_angle: Option<f64>,
    pub horizontal_flip: Option<bool>,
    pub vertical_flip: Option<bool>,
    pub aspect_ratio_locked: Option<bool>,
    pub sizes_locked: Option<bool>,
}

impl RawGeometry {
    /// Fill the gaps from the defaults policy.
    pub fn resolve(&self, defaults: &dyn Defaults) -> Geometry {
        Geometry {
            natural_size: self.natural_size.unwrap_or_else(|| defaults.natural_size()),
            position: self.position.unwrap_or_else(|| defaults.position()),
            angle: self.angle,
            shear_x_angle: self.shear_x_angle,
            shear_y_angle: self.shear_y_angle,
            horizontal_flip: self.horizontal_flip,
            vertical_flip: self.vertical_flip,
            aspect_ratio_locked: self.aspect_ratio_locked,
            sizes_locked: self.sizes_locked,
        }
    }
}

/// What happens to a page once it is fully collected.
pub trait CollectStrategy {
    fn on_page_closed(&mut self, page: Page, dict: &mut Dictionary);
}

/// Theme-pass strategy: master pages go into the dictionary.
#[derive(Debug, Default)]
pub struct ThemeStrategy;

impl CollectStrategy for ThemeStrategy {
    fn on_page_closed(&mut self, page: Page, dict: &mut Dictionary) {
        match page.id.clone() {
            Some(id) => {
                dict.masters.insert(id, page);
            },
            None => debug!("master page without an identifier, dropped"),
        }
    }
}

/// Content-pass strategy: pages are replayed into the sink.
pub struct ContentStrategy<'s> {
    sink: &'s mut dyn DocumentSink,
    slide_index: usize,
}

impl<'s> ContentStrategy<'s> {
    pub fn new(sink: &'s mut dyn DocumentSink) -> Self {
        Self {
            sink,
            slide_index: 0,
        }
    }
}

impl CollectStrategy for ContentStrategy<'_> {
    fn on_page_closed(&mut self, page: Page, dict: &mut Dictionary) {
        let output = Output::new();
        self.sink
            .start_slide(self.slide_index, page.id.as_ref().map(Id::as_str));

        // The master's content is the slide's backdrop. Its placeholders
        // are slots, not content; the slide draws those itself, fresh or
        // by reference.
        if let Some(master_id) = &page.master_ref {
            match dict.masters.get(master_id.as_str()) {
                Some(master) => {
                    for layer in &master.layers {
                        self.sink.start_layer();
                        for object in &layer.objects {
                            if matches!(object, Drawable::Placeholder(_)) {
                                continue;
                            }
                            object.draw(dict, &output, self.sink);
                        }
                        self.sink.end_layer();
                    }
                },
                None => warn!(id = master_id.as_str(), "dangling master reference"),
            }
        }

        for layer in &page.layers {
            self.sink.start_layer();
            for object in &layer.objects {
                object.draw(dict, &output, self.sink);
            }
            self.sink.end_layer();
        }

        if let Some(notes) = &page.notes {
            self.sink.start_notes();
            notes.draw(dict, &output, self.sink);
            self.sink.end_notes();
        }
        for note in &page.sticky_notes {
            self.sink.open_comment();
            note.draw(dict, &output, self.sink);
            self.sink.close_comment();
        }

        self.sink.end_slide();
        self.slide_index += 1;
    }
}

/// Scratch frame holding in-flight geometry and graphic style pending
/// attachment to the next drawable.
#[derive(Debug, Default)]
struct Level {
    geometry: Option<Geometry>,
    graphic_style: Option<StyleHandle>,
}

/// Text state parked while an attachment's drawables are collected.
#[derive(Debug)]
struct SuspendedText {
    text: Option<Text>,
    active: bool,
    paragraph: Option<Paragraph>,
    pending_line_breaks: usize,
}

/// The scene builder driven by a format parser.
pub struct Collector<'d, S: CollectStrategy> {
    dict: &'d mut Dictionary,
    defaults: &'d dyn Defaults,
    strategy: S,
    collecting: bool,

    levels: Vec<Level>,
    objects: Vec<Vec<Drawable>>,
    layer_open: bool,

    current_page: Page,
    current_stylesheet: Stylesheet,
    queued_styles: Vec<StyleHandle>,
    current_placeholder_style: Option<StyleHandle>,

    current_text: Option<Text>,
    text_active: bool,
    current_paragraph: Option<Paragraph>,
    pending_line_breaks: usize,
    suspended_texts: Vec<SuspendedText>,

    current_path: Option<Path>,
    current_table: Table,

    generated_data_ids: usize,
}

impl<'d, S: CollectStrategy> Collector<'d, S> {
    /// Create a collector over a shared dictionary.
    pub fn new(dict: &'d mut Dictionary, defaults: &'d dyn Defaults, strategy: S) -> Self {
        Self {
            dict,
            defaults,
            strategy,
            collecting: false,
            levels: Vec::new(),
            objects: Vec::new(),
            layer_open: false,
            current_page: Page::default(),
            current_stylesheet: Stylesheet::new(None),
            queued_styles: Vec::new(),
            current_placeholder_style: None,
            current_text: None,
            text_active: false,
            current_paragraph: None,
            pending_line_breaks: 0,
            suspended_texts: Vec::new(),
            current_path: None,
            current_table: Table::new(),
            generated_data_ids: 0,
        }
    }

    /// The shared dictionary (for parsers that resolve references inline).
    pub fn dictionary(&self) -> &Dictionary {
        self.dict
    }

    /// The defaults policy in effect.
    pub fn defaults(&self) -> &dyn Defaults {
        self.defaults
    }

    // --- pass control ---------------------------------------------------

    /// Begin the theme pass.
    pub fn start_themes(&mut self) {
        self.collecting = true;
    }

    /// Finish the theme pass.
    pub fn end_themes(&mut self) {
        self.collecting = false;
    }

    /// Begin the content pass.
    pub fn start_slides(&mut self) {
        self.collecting = true;
    }

    /// Finish the content pass.
    pub fn end_slides(&mut self) {
        self.collecting = false;
    }

    /// Whether collect calls are currently live.
    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    /// Record the declared presentation size.
    pub fn collect_presentation_size(&mut self, size: Size) {
        if !self.collecting {
            return;
        }
        self.dict.presentation_size = Some(size);
    }

    // --- page / layer / group / level stacks ----------------------------

    /// Open a slide or master-slide page.
    pub fn start_page(&mut self, id: Option<Id>, master_ref: Option<Id>) {
        if !self.collecting {
            return;
        }
        self.current_page = Page {
            id,
            master_ref,
            ..Page::default()
        };
    }

    /// Record the page's master-slide reference once the parser finds it.
    pub fn collect_master_ref(&mut self, master: Id) {
        if !self.collecting {
            return;
        }
        self.current_page.master_ref = Some(master);
    }

    /// Close the page and hand it to the strategy.
    pub fn end_page(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(!self.layer_open, "page closed with an open layer");
        debug_assert!(self.objects.is_empty(), "unbalanced object frames");
        debug_assert!(self.levels.is_empty(), "unbalanced levels");
        debug_assert!(!self.text_active, "page closed with open text");
        let page = std::mem::take(&mut self.current_page);
        self.strategy.on_page_closed(page, self.dict);
    }

    /// Open the page's drawable layer.
    pub fn start_layer(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(!self.layer_open, "layer already open");
        self.layer_open = true;
        self.objects.push(Vec::new());
        self.levels.push(Level::default());
    }

    /// Close the layer and attach it to the page.
    pub fn end_layer(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(self.layer_open, "no layer to close");
        debug_assert_eq!(self.objects.len(), 1, "unclosed groups at layer end");
        let objects = self.objects.pop().unwrap_or_default();
        self.levels.pop();
        self.layer_open = false;
        self.current_page.layers.push(Layer { objects });
    }

    /// Open a group; drawables collected until [`Self::end_group`] become
    /// its children.
    pub fn start_group(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(self.layer_open, "group outside a layer");
        self.objects.push(Vec::new());
    }

    /// Close the group: its child list and pending geometry become a group
    /// drawable in the parent frame.
    pub fn end_group(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(self.objects.len() > 1, "no group to close");
        let children = self.objects.pop().unwrap_or_default();
        let geometry = self.take_geometry();
        self.append(Drawable::Group(Group { geometry, children }));
    }

    /// Open a scratch frame without opening a drawable container.
    pub fn start_level(&mut self) {
        if !self.collecting {
            return;
        }
        self.levels.push(Level::default());
    }

    /// Close the innermost scratch frame.
    pub fn end_level(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(!self.levels.is_empty(), "no level to close");
        self.levels.pop();
    }

    // --- styles ---------------------------------------------------------

    /// Collect a style definition or reference.
    ///
    /// With `is_ref` set, `props` is ignored and the style is looked up by
    /// `id`; a miss is logged and yields `None`. Otherwise a new style is
    /// built, registered under `id` (when present) and under `ident` in the
    /// current stylesheet (when present and not `anonymous`), and queued
    /// for parent linking at stylesheet close.
    #[allow(clippy::too_many_arguments)]
    pub fn collect_style(
        &mut self,
        kind: StyleKind,
        id: Option<Id>,
        props: PropertyMap,
        ident: Option<String>,
        parent_ident: Option<String>,
        is_ref: bool,
        anonymous: bool,
    ) -> Option<StyleHandle> {
        if !self.collecting {
            return None;
        }
        let handle = if is_ref {
            debug_assert!(props.is_empty(), "style reference carries properties");
            let id = id?;
            self.dict.find_style(kind, &id)
        } else {
            let style = Style::new(kind, props, ident.clone(), parent_ident);
            let handle = self.dict.styles.insert(style);
            if let Some(id) = id {
                self.dict.register_style(kind, id, handle);
            }
            if let Some(ident) = &ident
                && !anonymous
            {
                self.current_stylesheet.insert(kind, ident, handle);
            }
            self.queued_styles.push(handle);
            Some(handle)
        };

        if let Some(handle) = handle {
            match kind {
                StyleKind::Layout => {
                    if let Some(text) = &mut self.current_text {
                        text.layout_style = Some(handle);
                    }
                },
                StyleKind::Placeholder => {
                    self.current_placeholder_style = Some(handle);
                },
                StyleKind::Graphic => {
                    if self.layer_open
                        && let Some(level) = self.levels.last_mut()
                    {
                        level.graphic_style = Some(handle);
                    }
                },
                // The remaining kinds (cell, connection, list, slide,
                // tabular, vector) are registered and linked but carry no
                // kind-specific side effects; see DESIGN.md.
                _ => {},
            }
        }
        handle
    }

    /// Close the stylesheet under construction.
    ///
    /// Resolves the parent stylesheet, registers the sheet under `id`,
    /// links every queued style against it, and starts a fresh sheet.
    pub fn collect_stylesheet(&mut self, id: Option<Id>, parent_ref: Option<Id>) {
        if !self.collecting {
            return;
        }
        let parent = parent_ref.and_then(|parent| self.dict.find_stylesheet(&parent));
        let mut sheet = std::mem::replace(&mut self.current_stylesheet, Stylesheet::new(None));
        sheet.set_parent(parent);
        let handle = self.dict.stylesheets.insert(sheet);
        if let Some(id) = id {
            self.dict.stylesheet_ids.insert(id, handle);
        }
        for style in self.queued_styles.drain(..) {
            self.dict
                .styles
                .link(style, Some(handle), &self.dict.stylesheets);
        }
    }

    // --- geometry and paths ----------------------------------------------

    /// Collect a geometry into the innermost scratch frame, filling gaps
    /// from the defaults policy.
    pub fn collect_geometry(&mut self, raw: RawGeometry) {
        if !self.collecting {
            return;
        }
        let geometry = raw.resolve(self.defaults);
        match self.levels.last_mut() {
            Some(level) => level.geometry = Some(geometry),
            None => debug!("geometry collected outside any level"),
        }
    }

    /// Collect a bezier definition or reference into the pending path slot.
    pub fn collect_bezier(&mut self, id: Option<Id>, path: Option<Path>, is_ref: bool) {
        if !self.collecting {
            return;
        }
        if is_ref {
            self.current_path = id.and_then(|id| self.dict.find_bezier(&id).cloned());
        } else {
            if let (Some(id), Some(path)) = (&id, &path) {
                self.dict.beziers.insert(id.clone(), path.clone());
            }
            self.current_path = path;
        }
    }

    fn stock_shape_size(&self) -> Size {
        self.levels
            .last()
            .and_then(|level| level.geometry.as_ref())
            .map(|geometry| geometry.natural_size)
            .unwrap_or_else(|| self.defaults.natural_size())
    }

    /// Synthesize a regular polygon outline as the pending path.
    pub fn collect_polygon_path(&mut self, edges: u32) {
        if !self.collecting {
            return;
        }
        self.current_path = geometry::make_polygon_path(self.stock_shape_size(), edges);
    }

    /// Synthesize a star outline as the pending path.
    pub fn collect_star_path(&mut self, points: u32, inner_radius: f64) {
        if !self.collecting {
            return;
        }
        self.current_path =
            geometry::make_star_path(self.stock_shape_size(), points, inner_radius);
    }

    /// Synthesize an arrow outline as the pending path.
    pub fn collect_arrow_path(&mut self, head_width: f64, stem_thickness: f64, double: bool) {
        if !self.collecting {
            return;
        }
        let size = self.stock_shape_size();
        self.current_path = if double {
            geometry::make_double_arrow_path(size, head_width, stem_thickness)
        } else {
            geometry::make_arrow_path(size, head_width, stem_thickness)
        };
    }

    /// Synthesize a rounded rectangle outline as the pending path.
    pub fn collect_rounded_rectangle_path(&mut self, radius: f64) {
        if !self.collecting {
            return;
        }
        self.current_path = geometry::make_rounded_rectangle_path(self.stock_shape_size(), radius);
    }

    /// Synthesize a callout or quote-bubble outline as the pending path.
    pub fn collect_callout_path(&mut self, radius: f64, tail_x: f64, tail_y: f64, quote: bool) {
        if !self.collecting {
            return;
        }
        let size = self.stock_shape_size();
        self.current_path = if quote {
            geometry::make_quote_bubble_path(size, radius, tail_x, tail_y)
        } else {
            geometry::make_callout_path(size, radius, tail_x, tail_y)
        };
    }

    /// Synthesize a connector curve as the pending path.
    pub fn collect_connection_path(&mut self, middle_x: f64, middle_y: f64) {
        if !self.collecting {
            return;
        }
        self.current_path =
            geometry::make_connection_path(self.stock_shape_size(), middle_x, middle_y);
    }

    // --- drawables -------------------------------------------------------

    /// Collect a shape from the pending geometry, graphic style, path, and
    /// text.
    pub fn collect_shape(&mut self) {
        if !self.collecting {
            return;
        }
        let shape = Shape {
            geometry: self.take_geometry(),
            style: self.take_graphic_style(),
            path: self.current_path.take(),
            text: self.take_text(),
        };
        self.append(Drawable::Shape(shape));
    }

    /// Collect a connector from the pending geometry and path.
    pub fn collect_connection(&mut self) {
        if !self.collecting {
            return;
        }
        let connection = Connection {
            geometry: self.take_geometry(),
            style: self.take_graphic_style(),
            path: self.current_path.take(),
        };
        self.append(Drawable::Connection(connection));
    }

    /// Collect a line with explicit endpoints.
    pub fn collect_line(&mut self, head: Option<Position>, tail: Option<Position>) {
        if !self.collecting {
            return;
        }
        let line = Line {
            geometry: self.take_geometry(),
            style: self.take_graphic_style(),
            head,
            tail,
        };
        self.append(Drawable::Line(line));
    }

    /// Register media data; returns the identifier it is reachable under.
    pub fn collect_data(&mut self, id: Option<Id>, path: String) -> Option<Id> {
        if !self.collecting {
            return None;
        }
        let id = id.unwrap_or_else(|| {
            self.generated_data_ids += 1;
            Id::new(format!("longan-data-{}", self.generated_data_ids))
        });
        self.dict.data.insert(id.clone(), path);
        Some(id)
    }

    /// Collect an image drawable referencing registered data.
    pub fn collect_image(&mut self, data: Option<Id>) {
        if !self.collecting {
            return;
        }
        let image = Image {
            geometry: self.take_geometry(),
            style: self.take_graphic_style(),
            data,
        };
        self.append(Drawable::Image(image));
    }

    /// Collect a media drawable (movie, sound) referencing registered data.
    pub fn collect_media(&mut self, data: Option<Id>) {
        if !self.collecting {
            return;
        }
        let media = Media {
            geometry: self.take_geometry(),
            style: self.take_graphic_style(),
            data,
        };
        self.append(Drawable::Media(media));
    }

    /// Collect a text placeholder, fresh or by reference.
    ///
    /// A fresh placeholder captures the pending text and the current
    /// placeholder style; its geometry lives in that style. A reference
    /// resolves against the title/body registry and degrades to a no-op
    /// when dangling.
    pub fn collect_text_placeholder(&mut self, id: Option<Id>, title: bool, is_ref: bool) {
        if !self.collecting {
            return;
        }
        if is_ref {
            let Some(id) = id else {
                debug!("placeholder reference without an identifier");
                return;
            };
            if let Some(placeholder) = self.dict.find_placeholder(&id, title).cloned() {
                self.append(Drawable::Placeholder(placeholder));
            }
            return;
        }

        let placeholder = Placeholder {
            kind: Some(if title {
                PlaceholderKind::Title
            } else {
                PlaceholderKind::Body
            }),
            style: self.current_placeholder_style.take(),
            text: self.take_text(),
        };
        if let Some(id) = id {
            let registry = if title {
                &mut self.dict.title_placeholders
            } else {
                &mut self.dict.body_placeholders
            };
            registry.insert(id, placeholder.clone());
        }
        self.append(Drawable::Placeholder(placeholder));
    }

    /// Capture the pending text as the page's presenter notes.
    pub fn collect_note(&mut self) {
        if !self.collecting {
            return;
        }
        self.current_page.notes = self.take_text();
    }

    /// Capture the pending text as a sticky-note comment.
    pub fn collect_sticky_note(&mut self) {
        if !self.collecting {
            return;
        }
        if let Some(text) = self.take_text() {
            self.current_page.sticky_notes.push(text);
        }
    }

    // --- tables ----------------------------------------------------------

    /// Declare the table grid before its cells.
    pub fn collect_table_sizes(&mut self, column_sizes: Vec<f64>, row_sizes: Vec<f64>) {
        if !self.collecting {
            return;
        }
        self.current_table.set_sizes(column_sizes, row_sizes);
    }

    /// Place a cell at the cursor. Without explicit content, the pending
    /// text (if any) becomes the cell's rich text.
    pub fn collect_table_cell(
        &mut self,
        content: Option<CellContent>,
        style: Option<StyleHandle>,
        column_span: usize,
        row_span: usize,
    ) {
        if !self.collecting {
            return;
        }
        let content = match content {
            Some(content) => Some(content),
            None => self.take_text().map(CellContent::Text),
        };
        self.current_table.insert_cell(Cell {
            content,
            style,
            column_span,
            row_span,
        });
    }

    /// Mark the cursor cell as covered by an earlier span.
    pub fn collect_covered_table_cell(&mut self) {
        if !self.collecting {
            return;
        }
        self.current_table.insert_covered_cell();
    }

    /// Skip cells that stay empty.
    pub fn collect_table_cell_move(&mut self, count: usize) {
        if !self.collecting {
            return;
        }
        self.current_table.move_cursor(count);
    }

    /// Finish the table: attach the pending geometry, append it as a
    /// drawable, and reset the accumulator.
    pub fn collect_table(&mut self) {
        if !self.collecting {
            return;
        }
        let mut table = std::mem::take(&mut self.current_table);
        table.geometry = self.take_geometry();
        self.append(Drawable::Table(Box::new(table)));
    }

    // --- text ------------------------------------------------------------

    /// Begin accumulating a text block. At most one may be in flight.
    pub fn start_text(&mut self, object: bool) {
        if !self.collecting {
            return;
        }
        debug_assert!(!self.text_active, "text already in progress");
        if self.current_text.is_some() {
            debug!("unconsumed text discarded");
        }
        self.current_text = Some(Text::new(object));
        self.text_active = true;
    }

    /// Stop accumulating; the text stays pending until a drawable or side
    /// channel consumes it.
    pub fn end_text(&mut self) {
        if !self.collecting {
            return;
        }
        debug_assert!(self.text_active, "no text in progress");
        self.text_active = false;
    }

    /// Open a paragraph inside the active text.
    pub fn start_paragraph(&mut self, style: Option<StyleHandle>) {
        if !self.collecting {
            return;
        }
        debug_assert!(self.text_active, "paragraph outside text");
        debug_assert!(self.current_paragraph.is_none(), "paragraph already open");
        self.current_paragraph = Some(Paragraph {
            style,
            inlines: smallvec![],
        });
        self.pending_line_breaks = 0;
    }

    /// Close the paragraph, materializing any deferred line breaks.
    pub fn end_paragraph(&mut self) {
        if !self.collecting {
            return;
        }
        self.flush_line_breaks();
        let Some(paragraph) = self.current_paragraph.take() else {
            debug_assert!(false, "no paragraph to close");
            return;
        };
        if let Some(text) = &mut self.current_text {
            text.paragraphs.push(paragraph);
        }
    }

    /// Append a text run with an optional character style.
    pub fn insert_text(&mut self, content: &str, style: Option<StyleHandle>) {
        if !self.collecting {
            return;
        }
        self.flush_line_breaks();
        if let Some(paragraph) = &mut self.current_paragraph {
            paragraph.inlines.push(Inline::Span {
                text: content.to_string(),
                style,
            });
        }
    }

    /// Append a tabulator.
    pub fn insert_tab(&mut self) {
        if !self.collecting {
            return;
        }
        self.flush_line_breaks();
        if let Some(paragraph) = &mut self.current_paragraph {
            paragraph.inlines.push(Inline::Tab);
        }
    }

    /// Defer a line break; it materializes before the next inline or at
    /// paragraph close.
    pub fn insert_line_break(&mut self) {
        if !self.collecting {
            return;
        }
        self.pending_line_breaks += 1;
    }

    /// Append a generated field.
    pub fn insert_field(&mut self, kind: FieldKind) {
        if !self.collecting {
            return;
        }
        self.flush_line_breaks();
        if let Some(paragraph) = &mut self.current_paragraph {
            paragraph.inlines.push(Inline::Field(kind));
        }
    }

    /// Suspend the in-flight text while an inline attachment's drawables
    /// are collected. Attachments appear inside paragraphs, so without the
    /// suspension the attached shape would steal the surrounding text.
    pub fn start_attachment(&mut self) {
        if !self.collecting {
            return;
        }
        self.suspended_texts.push(SuspendedText {
            text: self.current_text.take(),
            active: self.text_active,
            paragraph: self.current_paragraph.take(),
            pending_line_breaks: self.pending_line_breaks,
        });
        self.text_active = false;
        self.pending_line_breaks = 0;
    }

    /// Resume the text suspended by the matching [`Self::start_attachment`].
    pub fn end_attachment(&mut self) {
        if !self.collecting {
            return;
        }
        let Some(saved) = self.suspended_texts.pop() else {
            debug_assert!(false, "no attachment to end");
            return;
        };
        self.current_text = saved.text;
        self.text_active = saved.active;
        self.current_paragraph = saved.paragraph;
        self.pending_line_breaks = saved.pending_line_breaks;
    }

    fn flush_line_breaks(&mut self) {
        if self.pending_line_breaks > 0
            && let Some(paragraph) = &mut self.current_paragraph
        {
            for _ in 0..self.pending_line_breaks {
                paragraph.inlines.push(Inline::LineBreak);
            }
        }
        self.pending_line_breaks = 0;
    }

    // --- internals -------------------------------------------------------

    fn append(&mut self, drawable: Drawable) {
        if let Some(frame) = self.objects.last_mut() {
            frame.push(drawable);
            return;
        }
        // Drawables collected outside an open layer (slide placeholders,
        // mainly) go on top of the page's last layer.
        match self.current_page.layers.last_mut() {
            Some(layer) => layer.objects.push(drawable),
            None => self.current_page.layers.push(Layer {
                objects: vec![drawable],
            }),
        }
    }

    fn take_geometry(&mut self) -> Option<Geometry> {
        self.levels.last_mut().and_then(|level| level.geometry.take())
    }

    fn take_graphic_style(&mut self) -> Option<StyleHandle> {
        self.levels
            .last_mut()
            .and_then(|level| level.graphic_style.take())
    }

    fn take_text(&mut self) -> Option<Text> {
        debug_assert!(!self.text_active, "consuming text while it is open");
        self.current_text.take().filter(|text| !text.is_empty())
    }

    /// Stack depths, used by the balance tests.
    #[cfg(test)]
    fn depths(&self) -> (usize, usize) {
        (self.objects.len(), self.levels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::props;
    use crate::style::PropertyValue;

    struct FixedDefaults;

    impl Defaults for FixedDefaults {
        fn presentation_size(&self) -> Size {
            Size::new(1024.0, 768.0)
        }
    }

    fn collect_page<S: CollectStrategy>(collector: &mut Collector<'_, S>) {
        collector.start_page(Some(Id::new("slide-1")), None);
        collector.start_layer();
        collector.collect_geometry(RawGeometry {
            natural_size: Some(Size::new(100.0, 100.0)),
            position: Some(Position::new(10.0, 20.0)),
            ..RawGeometry::default()
        });
        collector.collect_polygon_path(4);
        collector.collect_shape();
        collector.end_layer();
        collector.end_page();
    }

    #[test]
    fn test_idle_collector_ignores_everything() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        // No start_themes: everything below must be a no-op.
        collector.start_page(Some(Id::new("m")), None);
        collector.start_layer();
        collector.collect_shape();
        collector.end_layer();
        collector.end_page();
        assert!(dict.masters.is_empty());
    }

    #[test]
    fn test_stack_depth_restored_after_layer() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("master-1")), None);
        assert_eq!(collector.depths(), (0, 0));
        collector.start_layer();
        collector.start_group();
        collector.collect_shape();
        collector.end_group();
        collector.end_layer();
        assert_eq!(collector.depths(), (0, 0));
        collector.end_page();
        collector.end_themes();
        assert!(dict.masters.contains_key("master-1"));
    }

    #[test]
    fn test_group_children_attached() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("m")), None);
        collector.start_layer();
        collector.start_group();
        collector.collect_shape();
        collector.collect_shape();
        collector.end_group();
        collector.end_layer();
        collector.end_page();
        collector.end_themes();

        let master = &dict.masters["m"];
        assert_eq!(master.layers.len(), 1);
        let Drawable::Group(group) = &master.layers[0].objects[0] else {
            panic!("expected a group");
        };
        assert_eq!(group.children.len(), 2);
    }

    #[test]
    fn test_geometry_consumed_by_next_drawable() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collect_page(&mut collector);
        collector.end_themes();

        let master = &dict.masters["slide-1"];
        let Drawable::Shape(shape) = &master.layers[0].objects[0] else {
            panic!("expected a shape");
        };
        let geometry = shape.geometry.as_ref().unwrap();
        assert_eq!(geometry.position, Position::new(10.0, 20.0));
        assert!(shape.path.is_some());
    }

    #[test]
    fn test_geometry_defaults_applied() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("m")), None);
        collector.start_layer();
        collector.collect_geometry(RawGeometry::default());
        collector.collect_shape();
        collector.end_layer();
        collector.end_page();
        collector.end_themes();

        let Drawable::Shape(shape) = &dict.masters["m"].layers[0].objects[0] else {
            panic!("expected a shape");
        };
        let geometry = shape.geometry.as_ref().unwrap();
        assert_eq!(geometry.natural_size, Size::new(100.0, 100.0));
        assert_eq!(geometry.position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_deferred_line_breaks_materialize_at_close() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("m")), None);
        collector.start_text(true);
        collector.start_paragraph(None);
        collector.insert_text("a", None);
        collector.insert_line_break();
        collector.insert_line_break();
        collector.end_paragraph();
        collector.end_text();

        let text = collector.take_text().unwrap();
        assert_eq!(
            text.paragraphs[0].inlines.as_slice(),
            &[
                Inline::Span {
                    text: "a".to_string(),
                    style: None
                },
                Inline::LineBreak,
                Inline::LineBreak,
            ]
        );
        collector.end_page();
        collector.end_themes();
    }

    #[test]
    fn test_style_side_effects() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("m")), None);

        // A placeholder style becomes the current placeholder style and is
        // captured by the next fresh placeholder.
        let mut props_map = PropertyMap::new();
        props_map.set(props::FONT_SIZE, PropertyValue::Number(36.0));
        collector.collect_style(
            StyleKind::Placeholder,
            Some(Id::new("ph-style")),
            props_map,
            None,
            None,
            false,
            false,
        );
        collector.start_text(true);
        collector.start_paragraph(None);
        collector.insert_text("Title", None);
        collector.end_paragraph();
        collector.end_text();
        collector.start_layer();
        collector.collect_text_placeholder(Some(Id::new("title-1")), true, false);
        collector.end_layer();
        collector.end_page();
        collector.end_themes();

        let placeholder = &dict.title_placeholders["title-1"];
        assert!(placeholder.style.is_some());
        assert!(placeholder.text.is_some());
    }

    #[test]
    fn test_style_reference_resolves_earlier_definition() {
        let mut dict = Dictionary::new();
        let defaults = FixedDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        let defined = collector.collect_style(
            StyleKind::Graphic,
            Some(Id::new("g1")),
            PropertyMap::new(),
            None,
            None,
            false,
            false,
        );
        let referenced = collector.collect_style(
            StyleKind::Graphic,
            Some(Id::new("g1")),
            PropertyMap::new(),
            None,
            None,
            true,
            false,
        );
        assert_eq!(defined, referenced);
        // A dangling reference degrades to nothing.
        let dangling = collector.collect_style(
            StyleKind::Graphic,
            Some(Id::new("nope")),
            PropertyMap::new(),
            None,
            None,
            true,
            false,
        );
        assert_eq!(dangling, None);
        collector.end_themes();
    }
}
