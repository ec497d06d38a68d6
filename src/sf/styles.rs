//! Parsing of style definitions, style references, and stylesheets.

use super::property_map::parse_property_map;
use super::tokens::style_kind;
use crate::collector::{CollectStrategy, Collector};
use crate::common::{Id, Result};
use crate::style::{PropertyMap, StyleHandle, StyleKind};
use crate::xml::{XmlReader, attr, element_id, element_ref, skip_element};
use quick_xml::events::{BytesStart, Event};

/// Parse one style definition or reference element and hand it to the
/// collector. `empty` means the element was self-closing.
pub fn parse_style<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    kind: StyleKind,
    is_ref: bool,
    anonymous: bool,
    empty: bool,
) -> Result<Option<StyleHandle>> {
    let id = if is_ref {
        element_ref(start)
    } else {
        element_id(start)
    };
    let ident = attr(start, b"sf:ident");
    let parent_ident = attr(start, b"sf:parent-ident");

    let mut props = PropertyMap::new();
    if !empty {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    // A reference carries no properties of its own; any
                    // markup inside one is ignored.
                    if !is_ref && e.name().as_ref() == b"sf:property-map" {
                        props = parse_property_map(reader, collector.defaults())?;
                    } else {
                        skip_element(reader)?;
                    }
                },
                Ok(Event::End(_)) => break,
                Ok(Event::Eof) => {
                    return Err(crate::common::Error::XmlError(
                        "unexpected end of document in style".to_string(),
                    ));
                },
                Err(e) => return Err(e.into()),
                _ => {},
            }
            buf.clear();
        }
    }

    Ok(collector.collect_style(kind, id, props, ident, parent_ident, is_ref, anonymous))
}

/// Try to parse an element as a style; returns `false` when the element is
/// not a style at all (the caller decides what to do with it).
pub fn try_parse_style<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    anonymous: bool,
    empty: bool,
) -> Result<bool> {
    match style_kind(start.name().as_ref()) {
        Some((kind, is_ref)) => {
            parse_style(reader, start, collector, kind, is_ref, anonymous, empty)?;
            Ok(true)
        },
        None => Ok(false),
    }
}

/// Parse a stylesheet element: an optional parent reference plus `sf:styles`
/// and `sf:anon-styles` lists. Closing the element closes the stylesheet in
/// the collector, which links all queued styles.
pub fn parse_stylesheet<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let id = element_id(start);
    let mut parent_ref: Option<Id> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:parent-ref" => {
                    parent_ref = element_ref(&e).or(parent_ref);
                    skip_element(reader)?;
                },
                b"sf:styles" => parse_style_list(reader, collector, false)?,
                b"sf:anon-styles" => parse_style_list(reader, collector, true)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"sf:parent-ref" {
                    parent_ref = element_ref(&e).or(parent_ref);
                }
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in stylesheet".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_stylesheet(id, parent_ref);
    Ok(())
}

fn parse_style_list<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
    anonymous: bool,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                if !try_parse_style(reader, &start, collector, anonymous, false)? {
                    skip_element(reader)?;
                }
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                try_parse_style(reader, &start, collector, anonymous, true)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in style list".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Defaults, Dictionary, ThemeStrategy};
    use crate::geometry::Size;
    use crate::style::{PropertyValue, props};
    use crate::xml::reader;

    struct TestDefaults;

    impl Defaults for TestDefaults {
        fn presentation_size(&self) -> Size {
            Size::new(800.0, 600.0)
        }
    }

    fn parse_sheet(dict: &mut Dictionary, xml: &str) {
        let defaults = TestDefaults;
        let mut collector = Collector::new(dict, &defaults, ThemeStrategy);
        collector.start_themes();
        let mut r = reader(xml);
        let mut buf = Vec::new();
        let Ok(Event::Start(e)) = r.read_event_into(&mut buf) else {
            panic!("expected start");
        };
        let start = e.into_owned();
        parse_stylesheet(&mut r, &start, &mut collector).unwrap();
        collector.end_themes();
    }

    #[test]
    fn test_stylesheet_links_forward_references() {
        let mut dict = Dictionary::new();
        // The child style appears before its parent; linking happens at
        // stylesheet close, so the forward reference still resolves.
        parse_sheet(
            &mut dict,
            r#"<key:stylesheet sfa:ID="ss-1">
                <sf:styles>
                    <sf:characterstyle sfa:ID="cs-child" sf:ident="emphasis" sf:parent-ident="base">
                        <sf:property-map>
                            <sf:italic><sf:number sfa:number="1"/></sf:italic>
                        </sf:property-map>
                    </sf:characterstyle>
                    <sf:characterstyle sfa:ID="cs-base" sf:ident="base">
                        <sf:property-map>
                            <sf:fontSize><sf:number sfa:number="18"/></sf:fontSize>
                        </sf:property-map>
                    </sf:characterstyle>
                </sf:styles>
            </key:stylesheet>"#,
        );

        let child = dict
            .find_style(crate::style::StyleKind::Character, &Id::new("cs-child"))
            .unwrap();
        let style = dict.styles.get(child).unwrap();
        assert!(style.is_linked());
        assert_eq!(
            style.get(props::FONT_SIZE, true, &dict.styles),
            Some(&PropertyValue::Number(18.0))
        );
    }

    #[test]
    fn test_anonymous_styles_not_in_stylesheet() {
        let mut dict = Dictionary::new();
        parse_sheet(
            &mut dict,
            r#"<key:stylesheet sfa:ID="ss-1">
                <sf:anon-styles>
                    <sf:graphic-style sfa:ID="g-anon" sf:ident="shady">
                        <sf:property-map/>
                    </sf:graphic-style>
                </sf:anon-styles>
            </key:stylesheet>"#,
        );

        // Reachable by id, but not named in the stylesheet.
        let handle = dict
            .find_style(crate::style::StyleKind::Graphic, &Id::new("g-anon"))
            .unwrap();
        let sheet = dict.stylesheet_ids.get("ss-1").unwrap();
        assert_eq!(
            dict.stylesheets
                .get(*sheet)
                .unwrap()
                .find_local(crate::style::StyleKind::Graphic, "shady"),
            None
        );
        assert!(dict.styles.get(handle).is_some());
    }
}
