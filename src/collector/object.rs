//! Drawable objects and the drawing context.
//!
//! The set of drawable kinds is fixed and small, so it is a closed enum
//! with an exhaustive `draw` match rather than an open class hierarchy.
//! [`Output`] carries the accumulated transformation and the active style
//! context through nested draws by value; nothing global is mutated.

use crate::collector::dictionary::Dictionary;
use crate::collector::table::Table;
use crate::collector::text::Text;
use crate::common::Id;
use crate::geometry::{Geometry, Position, Transformation};
use crate::sink::{DocumentSink, Rect};
use crate::style::{PropertyValue, StyleContext, StyleHandle, props, resolve_property};
use tracing::warn;

/// Drawing context threaded through nested draws.
#[derive(Debug, Clone, Default)]
pub struct Output {
    transform: Transformation,
    context: StyleContext,
}

impl Output {
    /// A fresh context with an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated transformation.
    pub fn transform(&self) -> &Transformation {
        &self.transform
    }

    /// The active style context.
    pub fn context(&self) -> &StyleContext {
        &self.context
    }

    /// Derive a context with `local` applied before the current transform.
    pub fn transformed(&self, local: Transformation) -> Self {
        Self {
            transform: local * self.transform,
            context: self.context.clone(),
        }
    }

    /// Derive a context with one more active style scope.
    pub fn with_style(&self, style: StyleHandle) -> Self {
        let mut context = self.context.clone();
        context.push(style);
        Self {
            transform: self.transform,
            context,
        }
    }
}

/// Which content slot a placeholder fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Title,
    Body,
    SlideNumber,
    Object,
}

/// A named content slot on a slide or master slide.
///
/// Geometry deliberately lives in the placeholder *style*, not on the
/// placeholder itself: a slide that does not override the slot inherits
/// the master's placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholder {
    pub kind: Option<PlaceholderKind>,
    pub style: Option<StyleHandle>,
    pub text: Option<Text>,
}

/// A grouped list of drawables with an optional shared geometry.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub geometry: Option<Geometry>,
    pub children: Vec<Drawable>,
}

/// A freestanding line.
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    pub head: Option<Position>,
    pub tail: Option<Position>,
}

/// A shape: outline path plus optional contained text.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    pub path: Option<crate::geometry::Path>,
    pub text: Option<Text>,
}

/// A bitmap image referencing registered data.
#[derive(Debug, Clone, Default)]
pub struct Image {
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    pub data: Option<Id>,
}

/// Other media (movie poster frames, sounds) referencing registered data.
#[derive(Debug, Clone, Default)]
pub struct Media {
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    pub data: Option<Id>,
}

/// A connector between two drawables.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub geometry: Option<Geometry>,
    pub style: Option<StyleHandle>,
    pub path: Option<crate::geometry::Path>,
}

/// Any drawable collected into a layer.
#[derive(Debug, Clone)]
pub enum Drawable {
    Group(Group),
    Image(Image),
    Line(Line),
    Media(Media),
    Shape(Shape),
    Connection(Connection),
    Placeholder(Placeholder),
    Table(Box<Table>),
}

/// One layer of drawables.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub objects: Vec<Drawable>,
}

/// A fully collected page (slide or master slide) handed to the strategy.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub id: Option<Id>,
    pub master_ref: Option<Id>,
    pub layers: Vec<Layer>,
    pub notes: Option<Text>,
    pub sticky_notes: Vec<Text>,
}

impl Drawable {
    /// Replay this object into the sink.
    pub fn draw(&self, dict: &Dictionary, output: &Output, sink: &mut dyn DocumentSink) {
        match self {
            Drawable::Group(group) => {
                let output = match &group.geometry {
                    Some(geometry) => output.transformed(geometry.transformation()),
                    None => output.clone(),
                };
                sink.start_group();
                for child in &group.children {
                    child.draw(dict, &output, sink);
                }
                sink.end_group();
            },
            Drawable::Shape(shape) => draw_shape(shape, dict, output, sink),
            Drawable::Connection(connection) => {
                let output = compose(connection.geometry.as_ref(), output);
                if let Some(path) = &connection.path {
                    let mut path = path.clone();
                    path.transform(output.transform());
                    sink.draw_connector(&path);
                }
            },
            Drawable::Line(line) => draw_line(line, output, sink),
            Drawable::Image(image) => {
                draw_media_object(image.geometry.as_ref(), image.data.as_ref(), dict, output, sink);
            },
            Drawable::Media(media) => {
                draw_media_object(media.geometry.as_ref(), media.data.as_ref(), dict, output, sink);
            },
            Drawable::Placeholder(placeholder) => {
                draw_placeholder(placeholder, dict, output, sink);
            },
            Drawable::Table(table) => {
                let output = compose(table.geometry.as_ref(), output);
                let bounds = object_bounds(table.geometry.as_ref(), &output);
                table.draw(bounds, dict, &output, sink);
            },
        }
    }
}

fn compose(geometry: Option<&Geometry>, output: &Output) -> Output {
    match geometry {
        Some(geometry) => output.transformed(geometry.transformation()),
        None => output.clone(),
    }
}

/// Bounding rectangle of a geometry under the accumulated transform.
///
/// The origin goes through the full transform; the extent is transformed in
/// distance mode so that translation does not distort it.
fn object_bounds(geometry: Option<&Geometry>, output: &Output) -> Rect {
    let Some(geometry) = geometry else {
        return Rect::default();
    };
    let (x, y) = output.transform().apply(0.0, 0.0, false);
    let (width, height) = output.transform().apply(
        geometry.natural_size.width,
        geometry.natural_size.height,
        true,
    );
    Rect::new(x, y, width, height)
}

fn draw_shape(shape: &Shape, dict: &Dictionary, output: &Output, sink: &mut dyn DocumentSink) {
    let output = match shape.style {
        Some(style) => compose(shape.geometry.as_ref(), output).with_style(style),
        None => compose(shape.geometry.as_ref(), output),
    };
    if let Some(path) = &shape.path {
        let mut path = path.clone();
        path.transform(output.transform());
        sink.draw_path(&path);
    }
    if let Some(text) = &shape.text
        && !text.is_empty()
    {
        let bounds = object_bounds(shape.geometry.as_ref(), &output);
        sink.start_text_object(bounds);
        text.draw(dict, &output, sink);
        sink.end_text_object();
    }
}

fn draw_line(line: &Line, output: &Output, sink: &mut dyn DocumentSink) {
    let output = compose(line.geometry.as_ref(), output);
    let (Some(head), Some(tail)) = (&line.head, &line.tail) else {
        // A line without both endpoints has nothing to show.
        warn!("line drawable is missing an endpoint");
        return;
    };
    let (x1, y1) = output.transform().apply(head.x, head.y, false);
    // The tail is stored relative to the head, so it moves as a vector.
    let (dx, dy) = output
        .transform()
        .apply(tail.x - head.x, tail.y - head.y, true);
    sink.draw_line(x1, y1, x1 + dx, y1 + dy);
}

fn draw_media_object(
    geometry: Option<&Geometry>,
    data: Option<&Id>,
    dict: &Dictionary,
    output: &Output,
    sink: &mut dyn DocumentSink,
) {
    let output = compose(geometry, output);
    let bounds = object_bounds(geometry, &output);
    let path = data.and_then(|id| {
        let found = dict.data.get(id.as_str());
        if found.is_none() {
            warn!(id = id.as_str(), "dangling media data reference");
        }
        found.map(String::as_str)
    });
    sink.draw_graphic_object(bounds, path);
}

fn draw_placeholder(
    placeholder: &Placeholder,
    dict: &Dictionary,
    output: &Output,
    sink: &mut dyn DocumentSink,
) {
    // The geometry comes from the placeholder style, resolved against the
    // active context, not from the scratch frame of whoever collected it.
    let geometry = match resolve_property(
        props::GEOMETRY,
        placeholder.style,
        &dict.styles,
        output.context(),
    ) {
        Some(PropertyValue::Geometry(geometry)) => Some(geometry.clone()),
        _ => None,
    };
    let output = match placeholder.style {
        Some(style) => output.with_style(style),
        None => output.clone(),
    };
    let output = compose(geometry.as_ref(), &output);
    let bounds = object_bounds(geometry.as_ref(), &output);

    let Some(text) = &placeholder.text else {
        return;
    };
    sink.start_text_object(bounds);
    text.draw(dict, &output, sink);
    sink.end_text_object();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::style::{PropertyMap, Style, StyleKind};

    #[derive(Default)]
    struct RecordingSink {
        text_objects: Vec<Rect>,
        lines: Vec<(f64, f64, f64, f64)>,
    }

    impl DocumentSink for RecordingSink {
        fn start_text_object(&mut self, bounds: Rect) {
            self.text_objects.push(bounds);
        }

        fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
            self.lines.push((x1, y1, x2, y2));
        }
    }

    #[test]
    fn test_placeholder_geometry_comes_from_style() {
        let mut dict = Dictionary::new();
        let mut props_map = PropertyMap::new();
        props_map.set(
            props::GEOMETRY,
            PropertyValue::Geometry(Geometry {
                natural_size: Size::new(80.0, 20.0),
                position: Position::new(10.0, 10.0),
                ..Geometry::default()
            }),
        );
        let style = dict
            .styles
            .insert(Style::new(StyleKind::Placeholder, props_map, None, None));

        let placeholder = Placeholder {
            kind: Some(PlaceholderKind::Title),
            style: Some(style),
            text: Some(Text {
                paragraphs: vec![Default::default()],
                ..Text::new(true)
            }),
        };

        let mut sink = RecordingSink::default();
        Drawable::Placeholder(placeholder).draw(&dict, &Output::new(), &mut sink);
        assert_eq!(sink.text_objects, vec![Rect::new(10.0, 10.0, 80.0, 20.0)]);
    }

    #[test]
    fn test_line_tail_moves_as_vector() {
        let line = Line {
            geometry: Some(Geometry {
                natural_size: Size::new(100.0, 100.0),
                position: Position::new(50.0, 0.0),
                ..Geometry::default()
            }),
            head: Some(Position::new(0.0, 0.0)),
            tail: Some(Position::new(100.0, 100.0)),
            ..Line::default()
        };
        let mut sink = RecordingSink::default();
        Drawable::Line(line).draw(&Dictionary::new(), &Output::new(), &mut sink);
        assert_eq!(sink.lines, vec![(50.0, 0.0, 150.0, 100.0)]);
    }
}
