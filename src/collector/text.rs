//! Collected text: paragraphs of inline content.

use crate::collector::dictionary::Dictionary;
use crate::collector::object::Output;
use crate::geometry::Geometry;
use crate::sink::{DocumentSink, FieldKind, ParagraphFormat, SpanFormat};
use crate::style::{
    PropertyValue, StyleContext, StyleHandle, StyleStore, props, resolve_property,
};
use smallvec::SmallVec;

/// One inline item inside a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A run of text with an optional character style.
    Span {
        text: String,
        style: Option<StyleHandle>,
    },
    /// A tabulator.
    Tab,
    /// An explicit line break.
    LineBreak,
    /// A generated field.
    Field(FieldKind),
}

/// A paragraph: an optional paragraph style plus ordered inline content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub style: Option<StyleHandle>,
    pub inlines: SmallVec<[Inline; 4]>,
}

/// A block of text collected from a shape, placeholder, or table cell.
///
/// The bounding geometry is assigned by the *container* at collection time;
/// text itself never knows where it will be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    /// Whether this text came from a drawable text object (as opposed to a
    /// side channel like notes).
    pub object: bool,
    /// Layout style attached while the text was being collected.
    pub layout_style: Option<StyleHandle>,
    /// Bounding box supplied by the owning container.
    pub bounds: Option<Geometry>,
    pub paragraphs: Vec<Paragraph>,
}

impl Text {
    /// Create an empty text block.
    pub fn new(object: bool) -> Self {
        Self {
            object,
            ..Self::default()
        }
    }

    /// Whether the text holds no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Replay the paragraphs into the sink.
    pub fn draw(&self, dict: &Dictionary, output: &Output, sink: &mut dyn DocumentSink) {
        for paragraph in &self.paragraphs {
            let format = paragraph_format(paragraph.style, &dict.styles, output.context());
            sink.open_paragraph(&format);
            for inline in &paragraph.inlines {
                match inline {
                    Inline::Span { text, style } => {
                        let format = span_format(*style, &dict.styles, output.context());
                        sink.open_span(&format);
                        sink.insert_text(text);
                        sink.close_span();
                    },
                    Inline::Tab => sink.insert_tab(),
                    Inline::LineBreak => sink.insert_line_break(),
                    Inline::Field(kind) => sink.insert_field(*kind),
                }
            }
            sink.close_paragraph();
        }
    }
}

/// Resolve the paragraph-level properties visible from `style`.
pub fn paragraph_format(
    style: Option<StyleHandle>,
    store: &StyleStore,
    context: &StyleContext,
) -> ParagraphFormat {
    let mut format = ParagraphFormat::default();
    if let Some(PropertyValue::Alignment(alignment)) =
        resolve_property(props::ALIGNMENT, style, store, context)
    {
        format.alignment = Some(*alignment);
    }
    if let Some(PropertyValue::Number(spacing)) =
        resolve_property(props::LINE_SPACING, style, store, context)
    {
        format.line_spacing = Some(*spacing);
    }
    if let Some(PropertyValue::Color(color)) =
        resolve_property(props::PARAGRAPH_FILL, style, store, context)
    {
        format.fill = Some(*color);
    }
    if let Some(PropertyValue::TabStops(stops)) =
        resolve_property(props::TAB_STOPS, style, store, context)
    {
        format.tab_stops = stops.iter().map(|stop| stop.position).collect();
    }
    format
}

/// Resolve the character-level properties visible from `style`.
pub fn span_format(
    style: Option<StyleHandle>,
    store: &StyleStore,
    context: &StyleContext,
) -> SpanFormat {
    let mut format = SpanFormat::default();
    if let Some(PropertyValue::Bool(bold)) = resolve_property(props::BOLD, style, store, context) {
        format.bold = Some(*bold);
    }
    if let Some(PropertyValue::Bool(italic)) =
        resolve_property(props::ITALIC, style, store, context)
    {
        format.italic = Some(*italic);
    }
    if let Some(PropertyValue::Bool(underline)) =
        resolve_property(props::UNDERLINE, style, store, context)
    {
        format.underline = Some(*underline);
    }
    if let Some(PropertyValue::Bool(strikethru)) =
        resolve_property(props::STRIKETHRU, style, store, context)
    {
        format.strikethru = Some(*strikethru);
    }
    if let Some(PropertyValue::Bool(outline)) =
        resolve_property(props::OUTLINE, style, store, context)
    {
        format.outline = Some(*outline);
    }
    if let Some(PropertyValue::Text(name)) =
        resolve_property(props::FONT_NAME, style, store, context)
    {
        format.font_name = Some(name.clone());
    }
    if let Some(PropertyValue::Number(size)) =
        resolve_property(props::FONT_SIZE, style, store, context)
    {
        format.font_size = Some(*size);
    }
    if let Some(PropertyValue::Color(color)) =
        resolve_property(props::FONT_COLOR, style, store, context)
    {
        format.font_color = Some(*color);
    }
    if let Some(PropertyValue::Baseline(baseline)) =
        resolve_property(props::BASELINE, style, store, context)
    {
        format.baseline = Some(*baseline);
    }
    if let Some(PropertyValue::Capitalization(capitalization)) =
        resolve_property(props::CAPITALIZATION, style, store, context)
    {
        format.capitalization = Some(*capitalization);
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{PropertyMap, Style, StyleKind};

    #[test]
    fn test_span_format_inherits_through_parent_chain() {
        let mut store = StyleStore::new();
        let mut base_props = PropertyMap::new();
        base_props.set(props::FONT_NAME, PropertyValue::Text("Gill Sans".to_string()));
        let base = store.insert(Style::new(StyleKind::Character, base_props, None, None));

        let mut child_props = PropertyMap::new();
        child_props.set(props::BOLD, PropertyValue::Bool(true));
        child_props.set_parent(Some(base));
        let child = store.insert(Style::new(StyleKind::Character, child_props, None, None));

        let format = span_format(Some(child), &store, &StyleContext::new());
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.font_name.as_deref(), Some("Gill Sans"));
        assert_eq!(format.italic, None);
    }
}
