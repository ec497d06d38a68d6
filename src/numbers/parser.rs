//! The Numbers document walker.
//!
//! A Numbers document is a list of workspaces (sheets); each sheet's page
//! carries tables and other drawables. Sheets map onto the sink's slide
//! brackets, one per workspace.

use crate::collector::{CollectStrategy, Collector};
use crate::common::{Error, Id, Result};
use crate::sf::drawables::{parse_drawable, parse_drawable_list};
use crate::sf::styles::parse_stylesheet;
use crate::sf::Pass;
use crate::xml::{XmlReader, attr, reader, skip_element};
use quick_xml::events::{BytesStart, Event};

/// Parse one full pass over a Numbers document.
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
                if e.name().as_ref() != b"ls:document" {
                    return Err(Error::InvalidFormat(
                        "expected an ls:document root".to_string(),
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
                    b"ls:stylesheet" => {
                        if pass == Pass::Theme {
                            parse_stylesheet(reader, &start, collector)?;
                        } else {
                            skip_element(reader)?;
                        }
                    },
                    b"ls:workspace-array" => {
                        if pass == Pass::Content {
                            parse_workspace_array(reader, collector)?;
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

fn parse_workspace_array<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"ls:workspace" => {
                    let start = e.into_owned();
                    parse_workspace(reader, &start, collector)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in workspace array".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

/// Parse one workspace (sheet) into a page.
fn parse_workspace<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let name = attr(start, b"ls:workspace-name").map(Id::new);
    collector.start_page(name, None);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"ls:page-info" => parse_page_info(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in workspace".to_string(),
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

fn parse_page_info<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_layer();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:drawables" => parse_drawable_list(reader, collector)?,
                    _ => {
                        if !parse_drawable(reader, &start, collector, false)? {
                            skip_element(reader)?;
                        }
                    },
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                parse_drawable(reader, &start, collector, true)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlError(
                    "unexpected end of document in page info".to_string(),
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
