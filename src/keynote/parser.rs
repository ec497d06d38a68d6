//! The APXL document walker.
//!
//! Both passes walk the same stream: the theme pass descends into
//! `key:theme-list` and skips `key:slide-list`, the content pass does the
//! opposite. Slides and master slides share one shape (`parse_page_element`);
//! the strategy inside the collector decides what a finished page means.

use crate::collector::{CollectStrategy, Collector};
use crate::common::{Error, Result};
use crate::geometry::Size;
use crate::sf::drawables::parse_drawable_list;
use crate::sf::styles::{parse_stylesheet, try_parse_style};
use crate::sf::text::parse_text;
use crate::sf::{Pass, geometry as sf_geometry};
use crate::xml::{XmlReader, attr_f64, element_id, element_ref, reader, skip_element};
use quick_xml::events::{BytesStart, Event};

/// Parse one full pass over an APXL document.
pub fn parse_document<S: CollectStrategy>(
    xml: &str,
    collector: &mut Collector<'_, S>,
    pass: Pass,
) -> Result<()> {
    let mut reader = reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() != b"key:presentation" {
                    return Err(Error::InvalidFormat(
                        "expected a key:presentation root".to_string(),
                    ));
                }
                parse_presentation(&mut reader, collector, pass)?;
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_presentation<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
    pass: Pass,
) -> Result<()> {
    match pass {
        Pass::Theme => collector.start_themes(),
        Pass::Content => collector.start_slides(),
    }
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:size" => {
                    let start = e.into_owned();
                    collect_size(&start, collector);
                    skip_element(reader)?;
                },
                b"key:theme-list" => {
                    if pass == Pass::Theme {
                        parse_theme_list(reader, collector)?;
                    } else {
                        skip_element(reader)?;
                    }
                },
                b"key:slide-list" => {
                    if pass == Pass::Content {
                        parse_slide_list(reader, collector)?;
                    } else {
                        skip_element(reader)?;
                    }
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"key:size" {
                    let start = e.into_owned();
                    collect_size(&start, collector);
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in presentation".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    match pass {
        Pass::Theme => collector.end_themes(),
        Pass::Content => collector.end_slides(),
    }
    Ok(())
}

fn collect_size<S: CollectStrategy>(start: &BytesStart<'_>, collector: &mut Collector<'_, S>) {
    if let (Some(w), Some(h)) = (attr_f64(start, b"sfa:w"), attr_f64(start, b"sfa:h")) {
        collector.collect_presentation_size(Size::new(w, h));
    }
}

fn parse_theme_list<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:theme" => parse_theme(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in theme list".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_theme<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:stylesheet" => {
                    let start = e.into_owned();
                    parse_stylesheet(reader, &start, collector)?;
                },
                b"key:master-slides" => parse_master_slides(reader, collector)?,
                b"key:size" => {
                    let start = e.into_owned();
                    collect_size(&start, collector);
                    skip_element(reader)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"key:size" {
                    let start = e.into_owned();
                    collect_size(&start, collector);
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in theme".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_master_slides<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:master-slide" => {
                    let start = e.into_owned();
                    parse_page_element(reader, &start, collector)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in master slides".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_slide_list<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:slide" => {
                    let start = e.into_owned();
                    parse_page_element(reader, &start, collector)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in slide list".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

/// Parse one `key:slide` or `key:master-slide` element.
fn parse_page_element<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_page(element_id(start), None);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"key:stylesheet" => parse_stylesheet(reader, &start, collector)?,
                    b"key:page" => parse_page_body(reader, collector)?,
                    b"key:master-ref" => {
                        if let Some(master) = element_ref(&start) {
                            collector.collect_master_ref(master);
                        }
                        skip_element(reader)?;
                    },
                    b"key:title-placeholder" => {
                        parse_placeholder(reader, &start, collector, true)?;
                    },
                    b"key:body-placeholder" => {
                        parse_placeholder(reader, &start, collector, false)?;
                    },
                    b"key:title-placeholder-ref" => {
                        collector.collect_text_placeholder(element_ref(&start), true, true);
                        skip_element(reader)?;
                    },
                    b"key:body-placeholder-ref" => {
                        collector.collect_text_placeholder(element_ref(&start), false, true);
                        skip_element(reader)?;
                    },
                    b"key:notes" => parse_notes(reader, collector)?,
                    b"key:sticky-notes" => parse_sticky_notes(reader, collector)?,
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"key:master-ref" => {
                        if let Some(master) = element_ref(&start) {
                            collector.collect_master_ref(master);
                        }
                    },
                    b"key:title-placeholder-ref" => {
                        collector.collect_text_placeholder(element_ref(&start), true, true);
                    },
                    b"key:body-placeholder-ref" => {
                        collector.collect_text_placeholder(element_ref(&start), false, true);
                    },
                    _ => {},
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in slide".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_page();
    Ok(())
}

/// Parse a `key:page` body: its layers of drawables.
fn parse_page_body<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:layers" => parse_layers(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in page".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_layers<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:layer" => parse_layer(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in layers".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_layer<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_layer();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:drawables" => parse_drawable_list(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in layer".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_layer();
    Ok(())
}

/// Parse a fresh title/body placeholder definition.
///
/// The scratch level isolates any geometry inside the element: a
/// placeholder's effective geometry comes from its style, not from the
/// frame.
fn parse_placeholder<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    title: bool,
) -> Result<()> {
    let id = element_id(start);
    collector.start_level();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:text" => parse_text(reader, &start, collector, true)?,
                    b"sf:geometry" => {
                        let raw = sf_geometry::parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    name if crate::sf::style_kind(name).is_some() => {
                        try_parse_style(reader, &start, collector, false, false)?;
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                if crate::sf::style_kind(start.name().as_ref()).is_some() {
                    try_parse_style(reader, &start, collector, false, true)?;
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in placeholder".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_text_placeholder(id, title, false);
    collector.end_level();
    Ok(())
}

fn parse_notes<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_level();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:text" => parse_text(reader, &start, collector, false)?,
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in notes".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_note();
    collector.end_level();
    Ok(())
}

fn parse_sticky_notes<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"key:sticky-note" | b"sf:sticky-note" => {
                    parse_sticky_note(reader, collector)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in sticky notes".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_sticky_note<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_level();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:text" => parse_text(reader, &start, collector, false)?,
                    b"sf:geometry" => {
                        let raw = sf_geometry::parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in sticky note".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_sticky_note();
    collector.end_level();
    Ok(())
}
