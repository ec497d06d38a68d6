//! Parsing of drawable elements shared by all three formats.

use super::geometry::{geometry_from_attrs, parse_geometry, read_point};
use super::tabular::parse_tabular_info;
use super::text::parse_text;
use super::tokens::style_kind;
use crate::collector::{CollectStrategy, Collector};
use crate::common::{Id, Result};
use crate::geometry::{Path, Position};
use crate::xml::{XmlReader, attr, attr_bool, attr_f64, attr_u32, element_id, element_ref, skip_element};
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// Parse one drawable element if recognized; returns `false` when the
/// element is not a drawable (the caller skips it).
pub fn parse_drawable<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    empty: bool,
) -> Result<bool> {
    match start.name().as_ref() {
        b"sf:drawable-shape" | b"sf:shape" => {
            if !empty {
                parse_shape(reader, collector)?;
            }
            Ok(true)
        },
        b"sf:group" => {
            if !empty {
                parse_group(reader, collector)?;
            }
            Ok(true)
        },
        b"sf:media" => {
            if !empty {
                parse_media(reader, collector, false)?;
            }
            Ok(true)
        },
        b"sf:image" => {
            if !empty {
                parse_media(reader, collector, true)?;
            }
            Ok(true)
        },
        b"sf:line" => {
            if !empty {
                parse_line(reader, collector)?;
            }
            Ok(true)
        },
        b"sf:connection-line" => {
            if !empty {
                parse_connection_line(reader, collector)?;
            }
            Ok(true)
        },
        b"sf:tabular-info" => {
            if !empty {
                parse_tabular_info(reader, start, collector)?;
            }
            Ok(true)
        },
        _ => Ok(false),
    }
}

/// Parse the children of a drawables container (`sf:drawables`, a group, a
/// layer body), dispatching each drawable and skipping everything else.
pub fn parse_drawable_list<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                if !parse_drawable(reader, &start, collector, false)? {
                    skip_element(reader)?;
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                parse_drawable(reader, &start, collector, true)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in drawables".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

/// Handle path elements common to shapes and connection lines. Returns
/// `true` when the element was a path.
fn parse_path_element<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    empty: bool,
) -> Result<bool> {
    match start.name().as_ref() {
        b"sf:bezier-path" => {
            if !empty {
                parse_bezier_path(reader, collector)?;
            }
            Ok(true)
        },
        b"sf:polygon-path" => {
            let edges = attr_u32(start, b"sf:sides").unwrap_or(3);
            collector.collect_polygon_path(edges);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        b"sf:star-path" => {
            let points = attr_u32(start, b"sf:points").unwrap_or(5);
            let inner_radius = attr_f64(start, b"sf:innerRadius").unwrap_or(0.5);
            collector.collect_star_path(points, inner_radius);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        b"sf:arrow-path" => {
            let head_width = attr_f64(start, b"sf:headWidth").unwrap_or(0.3);
            let stem_thickness = attr_f64(start, b"sf:stemThickness").unwrap_or(0.5);
            let double = attr_bool(start, b"sf:doubleArrow").unwrap_or(false);
            collector.collect_arrow_path(head_width, stem_thickness, double);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        b"sf:rounded-rectangle-path" => {
            let radius = attr_f64(start, b"sf:radius").unwrap_or(0.1);
            collector.collect_rounded_rectangle_path(radius);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        b"sf:callout2-path" | b"sf:quote-bubble-path" => {
            let quote = start.name().as_ref() == b"sf:quote-bubble-path";
            let radius = attr_f64(start, b"sf:cornerRadius").unwrap_or(0.1);
            let tail_x = attr_f64(start, b"sf:tailPositionX").unwrap_or(0.5);
            let tail_y = attr_f64(start, b"sf:tailPositionY").unwrap_or(1.2);
            collector.collect_callout_path(radius, tail_x, tail_y, quote);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        b"sf:connection-path" => {
            let middle_x = attr_f64(start, b"sfa:x").unwrap_or(0.5);
            let middle_y = attr_f64(start, b"sfa:y").unwrap_or(0.5);
            collector.collect_connection_path(middle_x, middle_y);
            if !empty {
                skip_element(reader)?;
            }
            Ok(true)
        },
        _ => Ok(false),
    }
}

fn parse_bezier_path<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) => collect_bezier_element(&e, collector),
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                collect_bezier_element(&start, collector);
                skip_element(reader)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in bezier path".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn collect_bezier_element<S: CollectStrategy>(
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) {
    match start.name().as_ref() {
        b"sf:bezier" => {
            let id = element_id(start);
            let path = attr(start, b"sfa:path").and_then(|source| {
                match Path::from_source(&source) {
                    Ok(path) => Some(path),
                    Err(_) => {
                        debug!(path = source.as_str(), "malformed bezier path");
                        None
                    },
                }
            });
            collector.collect_bezier(id, path, false);
        },
        b"sf:bezier-ref" => {
            collector.collect_bezier(element_ref(start), None, true);
        },
        _ => {},
    }
}

fn parse_shape<S: CollectStrategy>(
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
                    b"sf:geometry" => {
                        let raw = parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    b"sf:text" => parse_text(reader, &start, collector, true)?,
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, false)?;
                    },
                    _ => {
                        if !parse_path_element(reader, &start, collector, false)? {
                            skip_element(reader)?;
                        }
                    },
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => collector.collect_geometry(geometry_from_attrs(&start)),
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, true)?;
                    },
                    _ => {
                        parse_path_element(reader, &start, collector, true)?;
                    },
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in shape".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_shape();
    collector.end_level();
    Ok(())
}

fn parse_group<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_group();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => {
                        let raw = parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    _ => {
                        if !parse_drawable(reader, &start, collector, false)? {
                            skip_element(reader)?;
                        }
                    },
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => collector.collect_geometry(geometry_from_attrs(&start)),
                    _ => {
                        parse_drawable(reader, &start, collector, true)?;
                    },
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in group".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.end_group();
    Ok(())
}

fn parse_media<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
    image: bool,
) -> Result<()> {
    collector.start_level();
    let mut data: Option<Id> = None;
    parse_media_content(reader, collector, &mut data)?;
    if image {
        collector.collect_image(data);
    } else {
        collector.collect_media(data);
    }
    collector.end_level();
    Ok(())
}

/// Walk a media element's children, registering data and remembering the
/// identifier the drawable should reference.
fn parse_media_content<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
    data: &mut Option<Id>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => {
                        let raw = parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    // Containers between the media element and its data.
                    b"sf:content" | b"sf:image-media" | b"sf:filtered-image"
                    | b"sf:movie-media" => {
                        parse_media_content(reader, collector, data)?;
                    },
                    b"sf:data" => {
                        let id = element_id(&start);
                        if let Some(path) = attr(&start, b"sf:path") {
                            *data = collector.collect_data(id, path).or(data.take());
                        }
                        skip_element(reader)?;
                    },
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, false)?;
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => collector.collect_geometry(geometry_from_attrs(&start)),
                    b"sf:data" => {
                        let id = element_id(&start);
                        if let Some(path) = attr(&start, b"sf:path") {
                            *data = collector.collect_data(id, path).or(data.take());
                        }
                    },
                    b"sf:data-ref" => {
                        *data = element_ref(&start).or(data.take());
                    },
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, true)?;
                    },
                    _ => {},
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in media".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_line<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_level();
    let mut head: Option<Position> = None;
    let mut tail: Option<Position> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => {
                        let raw = parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    b"sf:head" => {
                        head = read_point(&start).or(head);
                        skip_element(reader)?;
                    },
                    b"sf:tail" => {
                        tail = read_point(&start).or(tail);
                        skip_element(reader)?;
                    },
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, false)?;
                    },
                    _ => skip_element(reader)?,
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => collector.collect_geometry(geometry_from_attrs(&start)),
                    b"sf:head" => head = read_point(&start).or(head),
                    b"sf:tail" => tail = read_point(&start).or(tail),
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, true)?;
                    },
                    _ => {},
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in line".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_line(head, tail);
    collector.end_level();
    Ok(())
}

fn parse_connection_line<S: CollectStrategy>(
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
                    b"sf:geometry" => {
                        let raw = parse_geometry(reader, &start)?;
                        collector.collect_geometry(raw);
                    },
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, false)?;
                    },
                    _ => {
                        if !parse_path_element(reader, &start, collector, false)? {
                            skip_element(reader)?;
                        }
                    },
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                match start.name().as_ref() {
                    b"sf:geometry" => collector.collect_geometry(geometry_from_attrs(&start)),
                    name if style_kind(name).is_some() => {
                        super::styles::try_parse_style(reader, &start, collector, true, true)?;
                    },
                    _ => {
                        parse_path_element(reader, &start, collector, true)?;
                    },
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in connection line".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_connection();
    collector.end_level();
    Ok(())
}
