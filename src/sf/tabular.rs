//! Parsing of tabular content (`sf:tabular-info`).
//!
//! The grid declares its column and row sizes first, then a data source
//! that walks a cell cursor across the grid. A formula that fails to parse
//! stays a plain value; the document keeps loading.

use super::text::parse_text;
use super::tokens::style_kind;
use crate::collector::{CellContent, CollectStrategy, Collector};
use crate::common::Result;
use crate::formula::Formula;
use crate::sf::geometry::parse_geometry;
use crate::style::StyleKind;
use crate::xml::{XmlReader, attr, attr_f64, attr_u32, skip_element};
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// Parse an `sf:tabular-info` element into a table drawable.
pub fn parse_tabular_info<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    _start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    collector.start_level();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:geometry" => {
                    let start = e.into_owned();
                    let raw = parse_geometry(reader, &start)?;
                    collector.collect_geometry(raw);
                },
                b"sf:tabular-model" => parse_tabular_model(reader, collector)?,
                name if style_kind(name).is_some() => {
                    let start = e.into_owned();
                    super::styles::try_parse_style(reader, &start, collector, true, false)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                super::styles::try_parse_style(reader, &start, collector, true, true)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in tabular info".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    collector.collect_table();
    collector.end_level();
    Ok(())
}

fn parse_tabular_model<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:grid" => parse_grid(reader, collector)?,
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in tabular model".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_grid<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut columns: Vec<f64> = Vec::new();
    let mut rows: Vec<f64> = Vec::new();
    let mut sizes_committed = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sf:columns" => {
                    columns = parse_sizes(reader, b"sf:grid-column", b"sf:width")?;
                },
                b"sf:rows" => {
                    rows = parse_sizes(reader, b"sf:grid-row", b"sf:height")?;
                },
                b"sf:datasource" => {
                    // The cursor needs the grid extent before cells arrive.
                    collector.collect_table_sizes(columns.clone(), rows.clone());
                    sizes_committed = true;
                    parse_datasource(reader, collector)?;
                },
                _ => skip_element(reader)?,
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in grid".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    if !sizes_committed {
        collector.collect_table_sizes(columns, rows);
    }
    Ok(())
}

fn parse_sizes(reader: &mut XmlReader<'_>, element: &[u8], attribute: &[u8]) -> Result<Vec<f64>> {
    let mut sizes = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == element
                    && let Some(size) = attr_f64(&e, attribute)
                {
                    sizes.push(size);
                }
            },
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == element
                    && let Some(size) = attr_f64(&e, attribute)
                {
                    sizes.push(size);
                }
                skip_element(reader)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in grid sizes".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(sizes)
}

fn cell_spans(start: &BytesStart<'_>) -> (usize, usize) {
    (
        attr_u32(start, b"sf:col-span").unwrap_or(1).max(1) as usize,
        attr_u32(start, b"sf:row-span").unwrap_or(1).max(1) as usize,
    )
}

fn parse_datasource<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    collector: &mut Collector<'_, S>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) => {
                let start = e.into_owned();
                parse_cell(reader, &start, collector, true)?;
            },
            Ok(Event::Start(e)) => {
                let start = e.into_owned();
                parse_cell(reader, &start, collector, false)?;
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(crate::common::Error::XmlError(
                    "unexpected end of document in datasource".to_string(),
                ));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
    Ok(())
}

fn parse_cell<S: CollectStrategy>(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    collector: &mut Collector<'_, S>,
    empty: bool,
) -> Result<()> {
    let (column_span, row_span) = cell_spans(start);
    match start.name().as_ref() {
        // Number cell: value in an attribute.
        b"sf:n" => {
            let value = attr(start, b"sfa:v").unwrap_or_default();
            if !empty {
                skip_element(reader)?;
            }
            collector.collect_table_cell(
                Some(CellContent::Value(value)),
                None,
                column_span,
                row_span,
            );
        },
        // Date cell: the formatted value is all the sink gets.
        b"sf:d" => {
            let value = attr(start, b"sf:cell-date").unwrap_or_default();
            if !empty {
                skip_element(reader)?;
            }
            collector.collect_table_cell(
                Some(CellContent::Value(value)),
                None,
                column_span,
                row_span,
            );
        },
        // Formula cell: fall back to the raw text when it does not parse.
        b"sf:f" => {
            let source = attr(start, b"sfa:fs").unwrap_or_default();
            if !empty {
                skip_element(reader)?;
            }
            let content = match Formula::parse(&source) {
                Some(formula) => CellContent::Formula(formula),
                None => {
                    debug!(formula = source.as_str(), "formula failed to parse");
                    CellContent::Value(source)
                },
            };
            collector.collect_table_cell(Some(content), None, column_span, row_span);
        },
        // Text cell: either a compact string or embedded rich text.
        b"sf:t" => {
            let mut content = attr(start, b"sfa:s").map(CellContent::Value);
            if !empty {
                let mut buf = Vec::new();
                loop {
                    match reader.read_event_into(&mut buf) {
                        Ok(Event::Start(e)) => match e.name().as_ref() {
                            b"sf:ct" => {
                                if let Some(value) = attr(&e, b"sfa:s") {
                                    content = Some(CellContent::Value(value));
                                }
                                skip_element(reader)?;
                            },
                            b"sf:text" => {
                                let start = e.into_owned();
                                parse_text(reader, &start, collector, false)?;
                            },
                            _ => skip_element(reader)?,
                        },
                        Ok(Event::Empty(e)) => {
                            if e.name().as_ref() == b"sf:ct"
                                && let Some(value) = attr(&e, b"sfa:s")
                            {
                                content = Some(CellContent::Value(value));
                            }
                        },
                        Ok(Event::End(_)) => break,
                        Ok(Event::Eof) => {
                            return Err(crate::common::Error::XmlError(
                                "unexpected end of document in text cell".to_string(),
                            ));
                        },
                        Err(e) => return Err(e.into()),
                        _ => {},
                    }
                    buf.clear();
                }
            }
            // Without compact content, any rich text parsed above is
            // pending in the collector and becomes the cell content.
            collector.collect_table_cell(content, None, column_span, row_span);
        },
        // Gap cell: nothing stored, the cursor moves on.
        b"sf:g" => {
            if !empty {
                skip_element(reader)?;
            }
            collector.collect_table_cell_move(1);
        },
        // Explicit cursor move.
        b"sf:s" => {
            let count = attr_u32(start, b"sfa:count").unwrap_or(1) as usize;
            if !empty {
                skip_element(reader)?;
            }
            collector.collect_table_cell_move(count);
        },
        // Covered cell (inside an earlier span).
        b"sf:o" => {
            if !empty {
                skip_element(reader)?;
            }
            collector.collect_covered_table_cell();
        },
        _ => {
            if !empty {
                skip_element(reader)?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Defaults, Dictionary, Drawable, ThemeStrategy};
    use crate::common::Id;
    use crate::geometry::Size;
    use crate::xml::reader;

    struct TestDefaults;

    impl Defaults for TestDefaults {
        fn presentation_size(&self) -> Size {
            Size::new(800.0, 600.0)
        }
    }

    #[test]
    fn test_parse_grid_with_formula_and_span() {
        let xml = r#"<sf:tabular-info>
            <sf:geometry>
                <sf:naturalSize sfa:w="200" sfa:h="100"/>
                <sf:position sfa:x="0" sfa:y="0"/>
            </sf:geometry>
            <sf:tabular-model>
                <sf:grid>
                    <sf:columns>
                        <sf:grid-column sf:width="100"/>
                        <sf:grid-column sf:width="100"/>
                    </sf:columns>
                    <sf:rows>
                        <sf:grid-row sf:height="50"/>
                        <sf:grid-row sf:height="50"/>
                    </sf:rows>
                    <sf:datasource>
                        <sf:n sfa:v="1"/>
                        <sf:n sfa:v="2"/>
                        <sf:f sfa:fs="=SUM(A1;B1)" sf:col-span="2"/>
                    </sf:datasource>
                </sf:grid>
            </sf:tabular-model>
        </sf:tabular-info>"#;

        let mut dict = Dictionary::new();
        let defaults = TestDefaults;
        let mut collector = Collector::new(&mut dict, &defaults, ThemeStrategy);
        collector.start_themes();
        collector.start_page(Some(Id::new("m")), None);
        collector.start_layer();

        let mut r = reader(xml);
        let mut buf = Vec::new();
        let Ok(Event::Start(e)) = r.read_event_into(&mut buf) else {
            panic!("expected start");
        };
        let start = e.into_owned();
        parse_tabular_info(&mut r, &start, &mut collector).unwrap();

        collector.end_layer();
        collector.end_page();
        collector.end_themes();

        let Drawable::Table(table) = &dict.masters["m"].layers[0].objects[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.column_sizes, vec![100.0, 100.0]);
        assert!(table.geometry.is_some());
        assert!(matches!(
            table.cell(0, 0).unwrap().content,
            Some(CellContent::Value(ref v)) if v == "1"
        ));
        let formula_cell = table.cell(1, 0).unwrap();
        assert_eq!(formula_cell.column_span, 2);
        assert!(matches!(
            formula_cell.content,
            Some(CellContent::Formula(_))
        ));
    }
}
