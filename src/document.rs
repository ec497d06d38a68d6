//! The document façade: detection, the two passes, and the sink.

use crate::collector::{Collector, ContentStrategy, Defaults, Dictionary, ThemeStrategy};
use crate::common::detection::{self, Detected, Format, SourceKind, Version};
use crate::common::{Error, Result};
use crate::package::IWorkPackage;
use crate::sf::Pass;
use crate::sink::DocumentSink;
use std::path::Path;

/// An opened iWork document.
///
/// Opening detects the container kind, the application format, and the
/// version; [`Document::parse`] then runs the theme pass followed by the
/// content pass and feeds the sink. The passes are strictly sequential:
/// the content pass resolves references against the dictionary the theme
/// pass produced.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::{Document, NullSink};
///
/// let document = Document::open("slideshow.key")?;
/// let mut sink = NullSink;
/// document.parse(&mut sink)?;
/// # Ok::<(), longan::Error>(())
/// ```
pub struct Document {
    package: IWorkPackage,
    detected: Detected,
}

impl Document {
    /// Open a document at `path` (a bundle directory, a ZIP package, or a
    /// bare main stream) and detect its format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = IWorkPackage::open(path)?;
        let detected = detection::detect(&package)?;
        Ok(Self { package, detected })
    }

    /// Whether `path` looks like a supported iWork document.
    pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
        Self::open(path).is_ok()
    }

    /// The detected application format.
    pub fn format(&self) -> Format {
        self.detected.format
    }

    /// The detected format version.
    pub fn version(&self) -> Version {
        self.detected.version
    }

    /// Whether the input was a full package or a bare main stream.
    pub fn source_kind(&self) -> SourceKind {
        self.detected.source
    }

    /// Parse the document and replay its content into `sink`.
    pub fn parse(&self, sink: &mut dyn DocumentSink) -> Result<()> {
        let content = self.package.open_stream(&self.detected.main_stream)?;
        let xml = String::from_utf8(content)
            .map_err(|_| Error::InvalidFormat("main stream is not valid UTF-8".to_string()))?;

        let defaults = self.defaults();
        let mut dict = Dictionary::new();

        // Theme pass: harvest master styles and pages into the dictionary.
        {
            let mut collector = Collector::new(&mut dict, defaults, ThemeStrategy);
            self.run_parser(&xml, &mut collector, Pass::Theme)?;
        }

        // Content pass: resolve against the dictionary, stream to the sink.
        let size = dict
            .presentation_size
            .unwrap_or_else(|| defaults.presentation_size());
        sink.start_document(size);
        {
            let strategy = ContentStrategy::new(sink);
            let mut collector = Collector::new(&mut dict, defaults, strategy);
            self.run_parser(&xml, &mut collector, Pass::Content)?;
        }
        sink.end_document();
        Ok(())
    }

    fn defaults(&self) -> &'static dyn Defaults {
        match self.detected.format {
            Format::Keynote => crate::keynote::defaults_for(self.detected.version),
            Format::Pages => crate::pages::defaults_for(self.detected.version),
            Format::Numbers => crate::numbers::defaults_for(self.detected.version),
        }
    }

    fn run_parser<S: crate::collector::CollectStrategy>(
        &self,
        xml: &str,
        collector: &mut Collector<'_, S>,
        pass: Pass,
    ) -> Result<()> {
        match self.detected.format {
            Format::Keynote => crate::keynote::parse_document(xml, collector, pass),
            Format::Pages => crate::pages::parse_document(xml, collector, pass),
            Format::Numbers => crate::numbers::parse_document(xml, collector, pass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ParagraphFormat, Rect, SpanFormat};
    use std::path::PathBuf;

    /// Records the sink event sequence as readable strings.
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
    }

    impl RecordingSink {
        fn has(&self, event: &str) -> bool {
            self.events.iter().any(|e| e == event)
        }

        fn index_of(&self, event: &str) -> usize {
            self.events
                .iter()
                .position(|e| e == event)
                .unwrap_or_else(|| panic!("event not recorded: {}\n{:#?}", event, self.events))
        }
    }

    impl DocumentSink for RecordingSink {
        fn start_document(&mut self, size: crate::geometry::Size) {
            self.events
                .push(format!("start-document {}x{}", size.width, size.height));
        }

        fn end_document(&mut self) {
            self.events.push("end-document".to_string());
        }

        fn start_slide(&mut self, index: usize, name: Option<&str>) {
            self.events
                .push(format!("start-slide {} {}", index, name.unwrap_or("-")));
        }

        fn end_slide(&mut self) {
            self.events.push("end-slide".to_string());
        }

        fn start_layer(&mut self) {
            self.events.push("start-layer".to_string());
        }

        fn end_layer(&mut self) {
            self.events.push("end-layer".to_string());
        }

        fn start_group(&mut self) {
            self.events.push("start-group".to_string());
        }

        fn end_group(&mut self) {
            self.events.push("end-group".to_string());
        }

        fn draw_path(&mut self, path: &crate::geometry::Path) {
            self.events.push(format!("path {}", path.to_source()));
        }

        fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
            self.events
                .push(format!("line {} {} {} {}", x1, y1, x2, y2));
        }

        fn start_text_object(&mut self, bounds: Rect) {
            self.events.push(format!(
                "text-object {} {} {} {}",
                bounds.x, bounds.y, bounds.width, bounds.height
            ));
        }

        fn end_text_object(&mut self) {
            self.events.push("end-text-object".to_string());
        }

        fn open_paragraph(&mut self, _format: &ParagraphFormat) {
            self.events.push("open-paragraph".to_string());
        }

        fn close_paragraph(&mut self) {
            self.events.push("close-paragraph".to_string());
        }

        fn open_span(&mut self, format: &SpanFormat) {
            self.events
                .push(format!("open-span bold={}", format.bold.unwrap_or(false)));
        }

        fn close_span(&mut self) {
            self.events.push("close-span".to_string());
        }

        fn insert_text(&mut self, text: &str) {
            self.events.push(format!("text '{}'", text));
        }

        fn insert_tab(&mut self) {
            self.events.push("tab".to_string());
        }

        fn insert_line_break(&mut self) {
            self.events.push("line-break".to_string());
        }

        fn open_table(&mut self, _bounds: Rect, column_sizes: &[f64]) {
            self.events.push(format!("open-table {:?}", column_sizes));
        }

        fn close_table(&mut self) {
            self.events.push("close-table".to_string());
        }

        fn open_table_row(&mut self, height: f64) {
            self.events.push(format!("open-row {}", height));
        }

        fn close_table_row(&mut self) {
            self.events.push("close-row".to_string());
        }

        fn open_table_cell(&mut self, column_span: usize, row_span: usize) {
            self.events
                .push(format!("open-cell {}x{}", column_span, row_span));
        }

        fn close_table_cell(&mut self) {
            self.events.push("close-cell".to_string());
        }

        fn insert_covered_table_cell(&mut self) {
            self.events.push("covered-cell".to_string());
        }

        fn start_notes(&mut self) {
            self.events.push("start-notes".to_string());
        }

        fn end_notes(&mut self) {
            self.events.push("end-notes".to_string());
        }

        fn open_comment(&mut self) {
            self.events.push("open-comment".to_string());
        }

        fn close_comment(&mut self) {
            self.events.push("close-comment".to_string());
        }
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const KEYNOTE_DOC: &str = r#"<?xml version="1.0"?>
<key:presentation key:version="92">
    <key:size sfa:w="1024" sfa:h="768"/>
    <key:theme-list>
        <key:theme>
            <key:stylesheet sfa:ID="theme-ss">
                <sf:styles>
                    <sf:characterstyle sfa:ID="cs-title" sf:ident="title-text">
                        <sf:property-map>
                            <sf:bold><sf:number sfa:number="1"/></sf:bold>
                        </sf:property-map>
                    </sf:characterstyle>
                </sf:styles>
            </key:stylesheet>
            <key:master-slides>
                <key:master-slide sfa:ID="master-1">
                    <key:page>
                        <sf:layers>
                            <sf:layer>
                                <sf:drawables>
                                    <sf:drawable-shape>
                                        <sf:geometry>
                                            <sf:naturalSize sfa:w="100" sfa:h="100"/>
                                            <sf:position sfa:x="0" sfa:y="0"/>
                                        </sf:geometry>
                                        <sf:polygon-path sf:sides="4"/>
                                    </sf:drawable-shape>
                                </sf:drawables>
                            </sf:layer>
                        </sf:layers>
                    </key:page>
                    <key:title-placeholder sfa:ID="title-ph">
                        <sf:placeholder-style sfa:ID="ph-style">
                            <sf:property-map>
                                <sf:geometry>
                                    <sf:naturalSize sfa:w="80" sfa:h="20"/>
                                    <sf:position sfa:x="10" sfa:y="10"/>
                                </sf:geometry>
                            </sf:property-map>
                        </sf:placeholder-style>
                        <sf:text>
                            <sf:text-storage>
                                <sf:text-body>
                                    <sf:p><sf:span sf:style="cs-title">Title</sf:span></sf:p>
                                </sf:text-body>
                            </sf:text-storage>
                        </sf:text>
                    </key:title-placeholder>
                </key:master-slide>
            </key:master-slides>
        </key:theme>
    </key:theme-list>
    <key:slide-list>
        <key:slide sfa:ID="slide-1">
            <key:master-ref sfa:IDREF="master-1"/>
            <key:page>
                <sf:layers>
                    <sf:layer>
                        <sf:drawables>
                            <sf:line>
                                <sf:geometry>
                                    <sf:naturalSize sfa:w="10" sfa:h="10"/>
                                    <sf:position sfa:x="5" sfa:y="5"/>
                                </sf:geometry>
                                <sf:head sfa:x="0" sfa:y="0"/>
                                <sf:tail sfa:x="10" sfa:y="10"/>
                            </sf:line>
                        </sf:drawables>
                    </sf:layer>
                </sf:layers>
            </key:page>
            <key:title-placeholder-ref sfa:IDREF="title-ph"/>
            <key:notes>
                <sf:text>
                    <sf:text-storage>
                        <sf:text-body><sf:p>presenter notes</sf:p></sf:text-body>
                    </sf:text-storage>
                </sf:text>
            </key:notes>
            <key:sticky-notes>
                <key:sticky-note>
                    <sf:text>
                        <sf:text-storage>
                            <sf:text-body><sf:p>remember this</sf:p></sf:text-body>
                        </sf:text-storage>
                    </sf:text>
                </key:sticky-note>
            </key:sticky-notes>
        </key:slide>
    </key:slide-list>
</key:presentation>"#;

    #[test]
    fn test_keynote_two_pass_placeholder_inheritance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "deck.apxl", KEYNOTE_DOC);

        let document = Document::open(&path).unwrap();
        assert_eq!(document.format(), Format::Keynote);
        assert_eq!(document.version(), Version::Keynote5);
        assert_eq!(document.source_kind(), SourceKind::MainFile);

        let mut sink = RecordingSink::default();
        document.parse(&mut sink).unwrap();

        assert!(sink.has("start-document 1024x768"));
        assert!(sink.has("start-slide 0 slide-1"));
        // The referenced placeholder is drawn with the geometry of the
        // master's placeholder style, untouched by the slide.
        assert!(sink.has("text-object 10 10 80 20"));
        // Character style from the theme stylesheet resolved onto the span.
        assert!(sink.has("open-span bold=true"));
        assert!(sink.has("text 'Title'"));
        // The master's diamond draws beneath the slide's line.
        let diamond = sink.index_of("path M 50 0 L 100 50 L 50 100 L 0 50 Z");
        let line = sink.index_of("line 5 5 15 15");
        assert!(diamond < line);
        // Side channels.
        let notes = sink.index_of("start-notes");
        assert!(notes < sink.index_of("end-notes"));
        assert!(sink.has("text 'presenter notes'"));
        assert!(sink.has("open-comment"));
        assert!(sink.has("text 'remember this'"));
        assert_eq!(sink.events.last().unwrap(), "end-document");
    }

    const NUMBERS_DOC: &str = r#"<?xml version="1.0"?>
<ls:document>
    <ls:workspace-array>
        <ls:workspace ls:workspace-name="Sheet 1">
            <ls:page-info>
                <sf:tabular-info>
                    <sf:geometry>
                        <sf:naturalSize sfa:w="200" sfa:h="60"/>
                        <sf:position sfa:x="20" sfa:y="30"/>
                    </sf:geometry>
                    <sf:tabular-model>
                        <sf:grid>
                            <sf:columns>
                                <sf:grid-column sf:width="100"/>
                                <sf:grid-column sf:width="100"/>
                            </sf:columns>
                            <sf:rows>
                                <sf:grid-row sf:height="30"/>
                                <sf:grid-row sf:height="30"/>
                            </sf:rows>
                            <sf:datasource>
                                <sf:n sfa:v="1"/>
                                <sf:n sfa:v="2"/>
                                <sf:f sfa:fs="=SUM(A1;B1)"/>
                                <sf:g/>
                            </sf:datasource>
                        </sf:grid>
                    </sf:tabular-model>
                </sf:tabular-info>
            </ls:page-info>
        </ls:workspace>
    </ls:workspace-array>
</ls:document>"#;

    #[test]
    fn test_numbers_sheet_with_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "index.xml", NUMBERS_DOC);

        let document = Document::open(&path).unwrap();
        assert_eq!(document.format(), Format::Numbers);

        let mut sink = RecordingSink::default();
        document.parse(&mut sink).unwrap();

        assert!(sink.has("start-slide 0 Sheet 1"));
        assert!(sink.has("open-table [100.0, 100.0]"));
        assert!(sink.has("text '1'"));
        // The formula re-renders canonically.
        assert!(sink.has("text '=SUM(A1;B1)'"));
        // Two declared rows are both replayed.
        assert_eq!(sink.events.iter().filter(|e| *e == "open-row 30").count(), 2);
    }

    const PAGES_DOC: &str = r#"<?xml version="1.0"?>
<sl:document>
    <sl:stylesheet sfa:ID="doc-ss">
        <sf:styles>
            <sf:characterstyle sfa:ID="cs-em" sf:ident="emphasis">
                <sf:property-map>
                    <sf:bold><sf:number sfa:number="1"/></sf:bold>
                </sf:property-map>
            </sf:characterstyle>
        </sf:styles>
    </sl:stylesheet>
    <sl:body>
        <sf:text-storage>
            <sf:text-body>
                <sf:section>
                    <sf:p>Plain and <sf:span sf:style="cs-em">bold</sf:span> words.</sf:p>
                    <sf:p>Second<sf:attachment><sf:drawable-shape>
                        <sf:geometry>
                            <sf:naturalSize sfa:w="100" sfa:h="100"/>
                            <sf:position sfa:x="0" sfa:y="0"/>
                        </sf:geometry>
                        <sf:polygon-path sf:sides="4"/>
                    </sf:drawable-shape></sf:attachment> paragraph.</sf:p>
                </sf:section>
            </sf:text-body>
        </sf:text-storage>
    </sl:body>
</sl:document>"#;

    #[test]
    fn test_pages_body_with_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "index.xml", PAGES_DOC);

        let document = Document::open(&path).unwrap();
        assert_eq!(document.format(), Format::Pages);
        assert_eq!(document.version(), Version::Pages4);

        let mut sink = RecordingSink::default();
        document.parse(&mut sink).unwrap();

        assert!(sink.has("start-document 612x792"));
        assert!(sink.has("text 'Plain and '"));
        assert!(sink.has("open-span bold=true"));
        assert!(sink.has("text 'bold'"));
        // The attachment's shape was drawn without swallowing the
        // surrounding paragraph.
        assert!(sink.has("path M 50 0 L 100 50 L 50 100 L 0 50 Z"));
        assert!(sink.has("text 'Second'"));
        assert!(sink.has("text ' paragraph.'"));
    }

    #[test]
    fn test_unsupported_and_invalid_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "note.xml", "<html><body/></html>");
        assert!(Document::open(&path).is_err());
        assert!(!Document::is_supported(&path));
    }
}

