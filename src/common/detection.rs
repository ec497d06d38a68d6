//! iWork format and version detection.
//!
//! Legacy iWork documents come in several shapes: a bundle directory with a
//! main XML stream, a ZIP package with the same layout, a bare (possibly
//! gzipped) XML stream, or the post-2013 IWA generation. Detection inspects
//! the package structure and the root element of the main stream to pick
//! the format, the version, and the matching parser/defaults pair.

use crate::common::{Error, Result};
use crate::package::IWorkPackage;

/// The application family a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Keynote,
    Pages,
    Numbers,
}

/// The concrete format version, which selects parser behavior and the
/// defaults strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Keynote2,
    Keynote3,
    Keynote4,
    Keynote5,
    Pages4,
    Numbers2,
}

impl Version {
    /// The format this version belongs to.
    pub fn format(self) -> Format {
        match self {
            Self::Keynote2 | Self::Keynote3 | Self::Keynote4 | Self::Keynote5 => Format::Keynote,
            Self::Pages4 => Format::Pages,
            Self::Numbers2 => Format::Numbers,
        }
    }
}

/// Whether the input was a full package or just the main stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    MainFile,
    Package,
}

/// The outcome of detection.
#[derive(Debug, Clone)]
pub struct Detected {
    pub format: Format,
    pub version: Version,
    pub source: SourceKind,
    /// Name of the main stream within the package.
    pub main_stream: String,
}

/// Candidate main-stream names, tried in order.
const KEYNOTE_STREAMS: &[&str] = &["index.apxl", "index.apxl.gz", "presentation.apxl"];
const XML_STREAMS: &[&str] = &["index.xml", "index.xml.gz"];

/// Detect the format of an opened package.
pub fn detect(package: &IWorkPackage) -> Result<Detected> {
    // The IWA generation stores snappy-compressed protobuf archives; it is
    // recognized so the caller gets a clear "unsupported" instead of a
    // parse failure.
    if package.has_stream("Index.zip") || package.has_stream("Index/Document.iwa") {
        return Err(Error::Unsupported(
            "IWA-based iWork packages are not supported".to_string(),
        ));
    }

    for name in KEYNOTE_STREAMS {
        if package.has_stream(name) {
            let head = package.open_stream(name)?;
            let version = keynote_version(&sniff_root(&head)?);
            return Ok(Detected {
                format: Format::Keynote,
                version,
                source: package.source_kind(),
                main_stream: (*name).to_string(),
            });
        }
    }

    for name in XML_STREAMS {
        if package.has_stream(name) {
            let head = package.open_stream(name)?;
            let root = sniff_root(&head)?;
            let detected = classify_root(&root, package.source_kind(), name)?;
            return Ok(detected);
        }
    }

    // A bare main file: the package exposes it under its own name.
    if let Some(name) = package.bare_stream_name() {
        let head = package.open_stream(&name)?;
        let root = sniff_root(&head)?;
        return classify_root(&root, SourceKind::MainFile, &name);
    }

    Err(Error::NotIWorkFile)
}

/// The root element of a document head, with its version attribute.
struct RootElement {
    name: String,
    version: Option<String>,
}

fn sniff_root(content: &[u8]) -> Result<RootElement> {
    use quick_xml::events::Event;
    let text = std::str::from_utf8(content)
        .map_err(|_| Error::InvalidFormat("main stream is not valid UTF-8".to_string()))?;
    let mut reader = quick_xml::Reader::from_str(text);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let version = crate::xml::attr(&e, b"key:version")
                    .or_else(|| crate::xml::attr(&e, b"sl:version"))
                    .or_else(|| crate::xml::attr(&e, b"ls:version"));
                return Ok(RootElement { name, version });
            },
            Ok(Event::Eof) => {
                return Err(Error::InvalidFormat("no root element".to_string()));
            },
            Err(e) => return Err(e.into()),
            _ => {},
        }
        buf.clear();
    }
}

fn classify_root(root: &RootElement, source: SourceKind, stream: &str) -> Result<Detected> {
    let (format, version) = match root.name.as_str() {
        "key:presentation" => (Format::Keynote, keynote_version(root)),
        "sl:document" => (Format::Pages, Version::Pages4),
        "ls:document" => (Format::Numbers, Version::Numbers2),
        other => {
            return Err(Error::InvalidFormat(format!(
                "unrecognized root element: {}",
                other
            )));
        },
    };
    Ok(Detected {
        format,
        version,
        source,
        main_stream: stream.to_string(),
    })
}

/// Map the APXL version attribute to a parser version.
///
/// Unknown values get the newest supported behavior; old documents are the
/// ones that need the distinction.
fn keynote_version(root: &RootElement) -> Version {
    match root.version.as_deref() {
        Some("36") => Version::Keynote2,
        Some("61") => Version::Keynote3,
        Some("72") => Version::Keynote4,
        Some("92") => Version::Keynote5,
        _ => Version::Keynote5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(xml: &str) -> RootElement {
        sniff_root(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_sniff_keynote_root() {
        let root = root_of(r#"<?xml version="1.0"?><key:presentation key:version="72"/>"#);
        assert_eq!(root.name, "key:presentation");
        assert_eq!(keynote_version(&root), Version::Keynote4);
    }

    #[test]
    fn test_unknown_version_maps_to_newest() {
        let root = root_of(r#"<key:presentation key:version="999"/>"#);
        assert_eq!(keynote_version(&root), Version::Keynote5);
        let root = root_of(r#"<key:presentation/>"#);
        assert_eq!(keynote_version(&root), Version::Keynote5);
    }

    #[test]
    fn test_classify_pages_and_numbers() {
        let pages = classify_root(
            &root_of("<sl:document/>"),
            SourceKind::MainFile,
            "index.xml",
        )
        .unwrap();
        assert_eq!(pages.format, Format::Pages);
        assert_eq!(pages.version, Version::Pages4);

        let numbers = classify_root(
            &root_of("<ls:document/>"),
            SourceKind::MainFile,
            "index.xml",
        )
        .unwrap();
        assert_eq!(numbers.format, Format::Numbers);

        assert!(classify_root(&root_of("<html/>"), SourceKind::MainFile, "x").is_err());
    }
}
