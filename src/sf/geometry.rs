//! Parsing of `sf:geometry` elements.
//!
//! Rotation and shear angles are stored in degrees in the file and carried
//! as radians everywhere else in the pipeline.

use crate::collector::RawGeometry;
use crate::common::Result;
use crate::geometry::{Position, Size};
use crate::xml::{XmlReader, attr_bool, attr_f64, skip_element};
use quick_xml::events::{BytesStart, Event};

fn degrees(value: f64) -> f64 {
    value.to_radians()
}

/// Read the geometry attributes carried on the element itself.
pub fn geometry_from_attrs(start: &BytesStart<'_>) -> RawGeometry {
    RawGeometry {
        natural_size: None,
        position: None,
        angle: attr_f64(start, b"sf:angle").map(degrees),
        shear_x_angle: attr_f64(start, b"sf:shearXAngle").map(degrees),
        shear_y_angle: attr_f64(start, b"sf:shearYAngle").map(degrees),
        horizontal_flip: attr_bool(start, b"sf:horizontalFlip"),
        vertical_flip: attr_bool(start, b"sf:verticalFlip"),
        aspect_ratio_locked: attr_bool(start, b"sf:aspectRatioLocked"),
        sizes_locked: attr_bool(start, b"sf:sizesLocked"),
    }
}

/// Parse a full `sf:geometry` element (attributes plus the `sf:naturalSize`
/// and `sf:position` children).
pub fn parse_geometry(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<RawGeometry> {
    let mut raw = geometry_from_attrs(start);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match e.name().as_ref() {
                    b"sf:naturalSize" | b"sf:size" => {
                        raw.natural_size = read_size(&e).or(raw.natural_size);
                    },
                    b"sf:position" => raw.position = read_position(&e).or(raw.position),
                    _ => {},
                }
                skip_element(reader)?;
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"sf:naturalSize" | b"sf:size" => {
                    raw.natural_size = read_size(&e).or(raw.natural_size);
                },
                b"sf:position" => raw.position = read_position(&e).or(raw.position),
                _ => {},
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in geometry".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(raw)
}

fn read_size(start: &BytesStart<'_>) -> Option<Size> {
    Some(Size::new(
        attr_f64(start, b"sfa:w")?,
        attr_f64(start, b"sfa:h")?,
    ))
}

fn read_position(start: &BytesStart<'_>) -> Option<Position> {
    Some(Position::new(
        attr_f64(start, b"sfa:x")?,
        attr_f64(start, b"sfa:y")?,
    ))
}

/// Read an `sfa:x`/`sfa:y` point from any element.
pub fn read_point(start: &BytesStart<'_>) -> Option<Position> {
    read_position(start)
}
