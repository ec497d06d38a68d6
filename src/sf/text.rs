//! Parsing of text storages into the collector.

use super::tokens::style_kind;
use crate::collector::{CollectStrategy, Collector};
use crate::common::{Id, Result};
use crate::sink::FieldKind;
use crate::style::{StyleHandle, StyleKind};
use crate::xml::{XmlReader, attr, skip_element};
use quick_xml::events::{BytesStart, Event};

/// Parse an `sf:text` element: the whole text block of a shape,
/// placeholder, note, or table cell.
pub fn parse_text<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    _start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    object: bool,
) -> Result<()> {
    collector.start_text(object);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:text-storage" => parse_text_storage(reader, collector)?,
                name if style_kind(name) == Some((StyleKind::Layout, false)) => {
                    let start = e.into_owned();
                    super::styles::parse_style(
                        reader,
                        &start,
                        collector,
                        StyleKind::Layout,
                        false,
                        true,
                        false,
                    )?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => {
                if style_kind(e.name().as_ref()) == Some((StyleKind::Layout, true)) {
                    let start = e.into_owned();
                    super::styles::parse_style(
                        reader,
                        &start,
                        collector,
                        StyleKind::Layout,
                        true,
                        true,
                        true,
                    )?;
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in text".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_text();
    Ok(())
}

/// Parse an `sf:text-storage` element; used directly by the Pages body.
pub fn parse_text_storage<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:text-body" => parse_text_body(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in text storage".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

/// Parse a text body: paragraphs, possibly grouped into sections.
pub fn parse_text_body<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:p" => {
                    let start = e.into_owned();
                    parse_paragraph(reader, &start, collector)?;
                },
                // Sections only group paragraphs; recurse into them.
                b"sf:section" => parse_text_body(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in text body".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

/// Resolve a style attribute against the dictionary.
fn style_attr<S: CollectStrategy>(
    start: &BytesStart<'_>,
    collector: &Collector<'_, S>,
    kind: StyleKind,
) -> Option<StyleHandle> {
    let id = attr(start, b"sf:style").map(Id::new)?;
    collector.dictionary().find_style(kind, &id)
}

fn parse_paragraph<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let style = style_attr(start, collector, StyleKind::Paragraph);
    collector.start_paragraph(style);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => {
                let decoded = t
                    .decode()
                    .map_err(|e| crate::common::Error::XmlError(e.to_string()))?;
                let content = quick_xml::escape::unescape(&decoded)
                    .map_err(|e| crate::common::Error::XmlError(e.to_string()))?;
                if !content.is_empty() {
                    collector.insert_text(&content, None);
                }
            },
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:span" => {
                    let start = e.into_owned();
                    parse_span(reader, &start, collector)?;
                },
                b"sf:tab" => {
                    collector.insert_tab();
                    skip_element(reader)?;
                },
                b"sf:br" | b"sf:crbr" | b"sf:lnbr" => {
                    collector.insert_line_break();
                    skip_element(reader)?;
                },
                b"sf:slide-number" => {
                    collector.insert_field(FieldKind::SlideNumber);
                    skip_element(reader)?;
                },
                // Anchored drawables; the surrounding text is parked while
                // their subtree is collected.
                b"sf:attachment" => {
                    collector.start_attachment();
                    super::drawables::parse_drawable_list(reader, collector)?;
                    collector.end_attachment();
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"sf:tab" => collector.insert_tab(),
                b"sf:br" | b"sf:crbr" | b"sf:lnbr" => collector.insert_line_break(),
                b"sf:slide-number" => collector.insert_field(FieldKind::SlideNumber),
                _ => {},
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in paragraph".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_paragraph();
    Ok(())
}

fn parse_span<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let style = style_attr(start, collector, StyleKind::Character);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => {
                let decoded = t
                    .decode()
                    .map_err(|e| crate::common::Error::XmlError(e.to_string()))?;
                let content = quick_xml::escape::unescape(&decoded)
                    .map_err(|e| crate::common::Error::XmlError(e.to_string()))?;
                if !content.is_empty() {
                    collector.insert_text(&content, style);
                }
            },
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:tab" => {
                    collector.insert_tab();
                    skip_element(reader)?;
                },
                b"sf:br" | b"sf:crbr" | b"sf:lnbr" => {
                    collector.insert_line_break();
                    skip_element(reader)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"sf:tab" => collector.insert_tab(),
                b"sf:br" | b"sf:crbr" | b"sf:lnbr" => collector.insert_line_break(),
                _ => {},
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in span".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}
