//! Parsing of `sf:property-map` elements.
//!
//! A property map is a list of property elements, each wrapping a typed
//! value element (`sf:number`, `sf:string`, `sf:color`) or a structured
//! value (geometry, tab stops). Unknown properties are skipped; a property
//! with a malformed value is dropped rather than failing the document.

use super::geometry::parse_geometry;
use super::tokens::{SfToken, token};
use crate::collector::Defaults;
use crate::common::Result;
use crate::style::{
    Alignment, Baseline, Capitalization, Color, PropertyMap, PropertyValue, TabStop, props,
};
use crate::xml::{XmlReader, attr, attr_f64, skip_element};
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// Parse a property map; the opening tag has already been consumed.
pub fn parse_property_map(
    reader: &mut XmlReader<'_>,
    defaults: &dyn Defaults,
) -> Result<PropertyMap> {
    let mut map = PropertyMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                match token(&name) {
                    Some(SfToken::Bold) => set_bool(reader, &mut map, props::BOLD)?,
                    Some(SfToken::Italic) => set_bool(reader, &mut map, props::ITALIC)?,
                    Some(SfToken::Underline) => set_bool(reader, &mut map, props::UNDERLINE)?,
                    Some(SfToken::Strikethru) => set_bool(reader, &mut map, props::STRIKETHRU)?,
                    Some(SfToken::Outline) => set_bool(reader, &mut map, props::OUTLINE)?,
                    Some(SfToken::FontSize) => set_number(reader, &mut map, props::FONT_SIZE)?,
                    Some(SfToken::LineSpacing) => {
                        set_number(reader, &mut map, props::LINE_SPACING)?;
                    },
                    Some(SfToken::FontName) => {
                        if let Some(name) = read_string_value(reader)? {
                            map.set(props::FONT_NAME, PropertyValue::Text(name));
                        }
                    },
                    Some(SfToken::FontColor) => {
                        if let Some(color) = read_color_value(reader)? {
                            map.set(props::FONT_COLOR, PropertyValue::Color(color));
                        }
                    },
                    Some(SfToken::ParagraphFill) => {
                        if let Some(color) = read_color_value(reader)? {
                            map.set(props::PARAGRAPH_FILL, PropertyValue::Color(color));
                        }
                    },
                    Some(SfToken::Alignment) => {
                        if let Some(number) = read_number_value(reader)? {
                            let alignment = match number as u32 {
                                0 => Alignment::Left,
                                1 => Alignment::Right,
                                2 => Alignment::Center,
                                3 => Alignment::Justify,
                                other => {
                                    debug!(value = other, "unknown alignment value");
                                    Alignment::Left
                                },
                            };
                            map.set(props::ALIGNMENT, PropertyValue::Alignment(alignment));
                        }
                    },
                    Some(SfToken::Baseline) => {
                        if let Some(number) = read_number_value(reader)? {
                            let baseline = match number as u32 {
                                1 => Baseline::Superscript,
                                2 => Baseline::Subscript,
                                _ => Baseline::Normal,
                            };
                            map.set(props::BASELINE, PropertyValue::Baseline(baseline));
                        }
                    },
                    Some(SfToken::Capitalization) => {
                        if let Some(number) = read_number_value(reader)? {
                            let capitalization = match number as u32 {
                                1 => Capitalization::AllCaps,
                                2 => Capitalization::SmallCaps,
                                3 => Capitalization::Title,
                                _ => Capitalization::None,
                            };
                            map.set(
                                props::CAPITALIZATION,
                                PropertyValue::Capitalization(capitalization),
                            );
                        }
                    },
                    Some(SfToken::Tabs) => {
                        let stops = read_tab_stops(reader)?;
                        if !stops.is_empty() {
                            map.set(props::TAB_STOPS, PropertyValue::TabStops(stops));
                        }
                    },
                    Some(SfToken::Geometry) => {
                        let start = e.into_owned();
                        let raw = parse_geometry(reader, &start)?;
                        map.set(
                            props::GEOMETRY,
                            PropertyValue::Geometry(raw.resolve(defaults)),
                        );
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::Empty(_)) => {},
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in property map".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(map)
}

fn set_bool(reader: &mut XmlReader<'_>, map: &mut PropertyMap, key: &str) -> Result<()> {
    if let Some(number) = read_number_value(reader)? {
        map.set(key, PropertyValue::Bool(number != 0.0));
    }
    Ok(())
}

fn set_number(reader: &mut XmlReader<'_>, map: &mut PropertyMap, key: &str) -> Result<()> {
    if let Some(number) = read_number_value(reader)? {
        map.set(key, PropertyValue::Number(number));
    }
    Ok(())
}

/// Read the children of a property element, returning the first
/// `sf:number` value.
fn read_number_value(reader: &mut XmlReader<'_>) -> Result<Option<f64>> {
    read_value(reader, |e| match token(e.name().as_ref()) {
        Some(SfToken::Number) => attr_f64(e, b"sfa:number"),
        _ => None,
    })
}

/// Read the first `sf:string` value.
fn read_string_value(reader: &mut XmlReader<'_>) -> Result<Option<String>> {
    read_value(reader, |e| match token(e.name().as_ref()) {
        Some(SfToken::String) => attr(e, b"sfa:string"),
        _ => None,
    })
}

/// Read the first `sf:color` value.
fn read_color_value(reader: &mut XmlReader<'_>) -> Result<Option<Color>> {
    read_value(reader, |e| match token(e.name().as_ref()) {
        Some(SfToken::Color) => Some(Color::new(
            attr_f64(e, b"sfa:r").unwrap_or(0.0),
            attr_f64(e, b"sfa:g").unwrap_or(0.0),
            attr_f64(e, b"sfa:b").unwrap_or(0.0),
            attr_f64(e, b"sfa:a").unwrap_or(1.0),
        )),
        _ => None,
    })
}

/// Read all `sf:tabstop` children.
fn read_tab_stops(reader: &mut XmlReader<'_>) -> Result<Vec<TabStop>> {
    let mut stops = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) => {
                if token(e.name().as_ref()) == Some(SfToken::Tabstop)
                    && let Some(position) = attr_f64(&e, b"sf:pos")
                {
                    stops.push(TabStop { position });
                }
            },
            Ok(Event::Start(e)) => {
                if token(e.name().as_ref()) == Some(SfToken::Tabstop)
                    && let Some(position) = attr_f64(&e, b"sf:pos")
                {
                    stops.push(TabStop { position });
                }
                skip_element(reader)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in tab stops".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(stops)
}

/// Scan a property element's children for a value, skipping the rest.
fn read_value<T>(
    reader: &mut XmlReader<'_>,
    mut extract: impl FnMut(&BytesStart<'_>) -> Option<T>,
) -> Result<Option<T>> {
    let mut value = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) => {
                if value.is_none() {
                    value = extract(&e);
                }
            },
            Ok(Event::Start(e)) => {
                if value.is_none() {
                    value = extract(&e);
                }
                skip_element(reader)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in property value".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(value)
}
