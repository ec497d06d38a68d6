//! Shared XML plumbing for the format parsers.
//!
//! All three legacy formats are driven the same way: a streaming reader,
//! dispatch on prefixed element names, and an unconditional "skip what you
//! do not recognize" rule. Skipping is what keeps collector calls balanced
//! in the face of well-formed-but-unexpected markup: an unknown subtree is
//! consumed here and never reaches the collector.

use crate::common::{Error, Id, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// The reader type used by every parser in this crate.
pub type XmlReader<'a> = Reader<&'a [u8]>;

/// Create a reader over a document string.
pub fn reader(xml: &str) -> XmlReader<'_> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

/// Consume the rest of the current element, including nested children.
///
/// Call after a `Start` event whose subtree is not recognized.
pub fn skip_element(reader: &mut XmlReader<'_>) -> Result<()> {
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            },
            Ok(Event::Eof) => {
                return Err(Error::XmlError("unexpected end of document".to_string()));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
}

/// Extract an attribute value by qualified name.
pub fn attr(start: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    for attr_result in start.attributes() {
        if let Ok(attr) = attr_result
            && attr.key.as_ref() == name
        {
            return attr
                .unescape_value()
                .ok()
                .map(|value| value.into_owned());
        }
    }
    None
}

/// Extract a floating-point attribute.
pub fn attr_f64(start: &BytesStart<'_>, name: &[u8]) -> Option<f64> {
    attr(start, name).and_then(|value| fast_float2::parse(value.trim()).ok())
}

/// Extract an unsigned integer attribute.
pub fn attr_u32(start: &BytesStart<'_>, name: &[u8]) -> Option<u32> {
    attr(start, name).and_then(|value| value.trim().parse().ok())
}

/// Extract a boolean attribute (`true`/`false`/`1`/`0`).
pub fn attr_bool(start: &BytesStart<'_>, name: &[u8]) -> Option<bool> {
    match attr(start, name)?.trim() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Extract an identifier attribute.
pub fn attr_id(start: &BytesStart<'_>, name: &[u8]) -> Option<Id> {
    attr(start, name).map(Id::new)
}

/// The `sfa:ID` attribute naming a definition.
pub fn element_id(start: &BytesStart<'_>) -> Option<Id> {
    attr_id(start, b"sfa:ID")
}

/// The `sfa:IDREF` attribute naming a reference.
pub fn element_ref(start: &BytesStart<'_>) -> Option<Id> {
    attr_id(start, b"sfa:IDREF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_element_consumes_nested_subtree() {
        let xml = "<a><b><c><d/>text</c><c/></b><e/></a>";
        let mut reader = reader(xml);
        let mut buf = Vec::new();

        // Enter <a>, then <b>, then skip b's subtree.
        assert!(matches!(reader.read_event_into(&mut buf), Ok(Event::Start(_))));
        buf.clear();
        assert!(matches!(reader.read_event_into(&mut buf), Ok(Event::Start(_))));
        buf.clear();
        skip_element(&mut reader).unwrap();

        // Next event is <e/>, a's remaining child.
        let event = reader.read_event_into(&mut buf);
        match event {
            Ok(Event::Empty(e)) => assert_eq!(e.name().as_ref(), b"e"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_skip_element_detects_truncation() {
        let xml = "<a><b>";
        let mut reader = reader(xml);
        let mut buf = Vec::new();
        assert!(matches!(reader.read_event_into(&mut buf), Ok(Event::Start(_))));
        buf.clear();
        assert!(matches!(reader.read_event_into(&mut buf), Ok(Event::Start(_))));
        skip_element(&mut reader).unwrap_err();
    }

    #[test]
    fn test_attr_helpers() {
        let xml = r#"<g sfa:ID="g-1" sf:angle="45.5" sf:flip="true" sf:n="7"/>"#;
        let mut reader = reader(xml);
        let mut buf = Vec::new();
        let Ok(Event::Empty(e)) = reader.read_event_into(&mut buf) else {
            panic!("expected an empty element");
        };
        assert_eq!(element_id(&e), Some(Id::new("g-1")));
        assert_eq!(attr_f64(&e, b"sf:angle"), Some(45.5));
        assert_eq!(attr_bool(&e, b"sf:flip"), Some(true));
        assert_eq!(attr_u32(&e, b"sf:n"), Some(7));
        assert_eq!(attr(&e, b"sf:missing"), None);
    }
}
