//! The Pages document walker.
//!
//! A Pages document is one long text flow with drawables anchored inside
//! it. The theme pass harvests the document stylesheet; the content pass
//! replays the body as a single page whose main text object carries the
//! flow, with attachments landing next to it on the same layer.

use crate::collector::{CollectStrategy, Collector};
use crate::common::{Error, Result};
use crate::sf::styles::parse_stylesheet;
use crate::sf::text::parse_text_storage;
use crate::sf::{Pass, drawables::parse_drawable_list};
use crate::xml::{XmlReader, reader, skip_element};
use quick_xml::events::Event;

/// Parse one full pass over a Pages document.
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
                if e.name().as_ref() != b"sl:document" {
                    return Err(Error::InvalidFormat(
                        "expected an sl:document root".to_string(),
                    ));
                }
                parse_document_body(&mut reader, collector, pass)?;
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_document_body<S: CollectStrategy>(
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
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sl:stylesheet" | b"sl:section-prototypes" => {
                        if pass == Pass::Theme {
                            parse_stylesheet(reader, &start, collector)?;
                        } else {
                            skip_element(reader)?;
                        }
                    },
                    b"sl:body" => {
                        if pass == Pass::Content {
                            parse_body(reader, collector)?;
                        } else {
                            skip_element(reader)?;
                        }
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document".to_string(),
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

/// Parse the main body: the text flow becomes the page's text object, and
/// any drawables anchored in it are collected alongside.
fn parse_body<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_page(None, None);
    collector.start_layer();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:text-storage" => {
                    collector.start_text(true);
                    parse_text_storage(reader, collector)?;
                    collector.end_text();
                    // The flow becomes a body text object without its own
                    // geometry; layout is the sink's concern.
                    collector.collect_shape();
                },
                b"sf:drawables" => parse_drawable_list(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in body".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_layer();
    collector.end_page();
    Ok(())
}
