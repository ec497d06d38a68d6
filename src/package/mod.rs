//! Container access for iWork documents.
//!
//! A document arrives as a bundle directory, a ZIP package, or a bare main
//! stream. [`IWorkPackage`] hides the difference behind named sub-streams
//! and decompresses `.gz` members transparently (the main stream is
//! usually stored as `index.apxl.gz` or `index.xml.gz`).

use crate::common::detection::SourceKind;
use crate::common::{Error, Result};
use flate2::read::GzDecoder;
use std::cell::RefCell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// An opened iWork container.
pub enum IWorkPackage {
    /// A bundle directory with member files.
    Directory(PathBuf),
    /// A single-file ZIP package.
    Zip(RefCell<ZipArchive<File>>),
    /// A bare main stream (possibly gzipped XML).
    MainFile(PathBuf),
}

impl IWorkPackage {
    /// Open a package at `path`, deciding the container kind from the file
    /// system and the file magic.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }

        let mut file = File::open(path)?;
        let mut magic = [0u8; 4];
        let n = file.read(&mut magic)?;
        if n >= 4 && &magic == b"PK\x03\x04" {
            let file = File::open(path)?;
            let archive = ZipArchive::new(file)
                .map_err(|e| Error::ZipError(e.to_string()))?;
            return Ok(Self::Zip(RefCell::new(archive)));
        }
        Ok(Self::MainFile(path.to_path_buf()))
    }

    /// Whether the input was a full package or a bare stream.
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::MainFile(_) => SourceKind::MainFile,
            _ => SourceKind::Package,
        }
    }

    /// For a bare main file, the name detection should sniff.
    pub fn bare_stream_name(&self) -> Option<String> {
        match self {
            Self::MainFile(path) => Some(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "index.xml".to_string()),
            ),
            _ => None,
        }
    }

    /// Whether a named member exists (without its `.gz` fallback).
    pub fn has_stream(&self, name: &str) -> bool {
        match self {
            Self::Directory(root) => root.join(name).is_file(),
            Self::Zip(archive) => archive.borrow_mut().by_name(name).is_ok(),
            Self::MainFile(path) => {
                path.file_name().map(|n| n.to_string_lossy() == name).unwrap_or(false)
            },
        }
    }

    /// Read a named member fully, decompressing gzip content.
    ///
    /// When `name` itself is missing, `name.gz` is tried before giving up.
    pub fn open_stream(&self, name: &str) -> Result<Vec<u8>> {
        let raw = self
            .read_raw(name)
            .or_else(|err| match self.read_raw(&format!("{}.gz", name)) {
                Ok(bytes) => Ok(bytes),
                Err(_) => Err(err),
            })?;
        maybe_gunzip(raw)
    }

    fn read_raw(&self, name: &str) -> Result<Vec<u8>> {
        match self {
            Self::Directory(root) => {
                let path = root.join(name);
                if !path.is_file() {
                    return Err(Error::ComponentNotFound(name.to_string()));
                }
                Ok(std::fs::read(path)?)
            },
            Self::Zip(archive) => {
                let mut archive = archive.borrow_mut();
                let mut member = archive
                    .by_name(name)
                    .map_err(|_| Error::ComponentNotFound(name.to_string()))?;
                let mut content = Vec::new();
                member.read_to_end(&mut content)?;
                Ok(content)
            },
            Self::MainFile(path) => {
                if !self.has_stream(name) {
                    return Err(Error::ComponentNotFound(name.to_string()));
                }
                Ok(std::fs::read(path)?)
            },
        }
    }
}

/// Decompress gzip content; anything else passes through.
fn maybe_gunzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.len() < 2 || bytes[0..2] != GZIP_MAGIC {
        return Ok(bytes);
    }
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_directory_package_with_gz_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let xml = r#"<key:presentation key:version="92"/>"#;
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(xml.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();
        std::fs::write(dir.path().join("index.apxl.gz"), &compressed).unwrap();

        let package = IWorkPackage::open(dir.path()).unwrap();
        assert_eq!(package.source_kind(), SourceKind::Package);
        assert!(package.has_stream("index.apxl.gz"));
        assert!(!package.has_stream("index.apxl"));
        // The plain name falls back to the .gz member and decompresses.
        let content = package.open_stream("index.apxl").unwrap();
        assert_eq!(content, xml.as_bytes());
    }

    #[test]
    fn test_bare_file_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slideshow.apxl");
        std::fs::write(&path, b"<key:presentation/>").unwrap();

        let package = IWorkPackage::open(&path).unwrap();
        assert_eq!(package.source_kind(), SourceKind::MainFile);
        assert_eq!(package.bare_stream_name().as_deref(), Some("slideshow.apxl"));
        let content = package.open_stream("slideshow.apxl").unwrap();
        assert_eq!(content, b"<key:presentation/>");
    }

    #[test]
    fn test_missing_member() {
        let dir = tempfile::tempdir().unwrap();
        let package = IWorkPackage::open(dir.path()).unwrap();
        assert!(matches!(
            package.open_stream("index.xml"),
            Err(Error::ComponentNotFound(_))
        ));
    }
}
