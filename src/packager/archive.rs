//! Archive writers that receive the rendered package entries

use crate::error::{PackagerError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Destination for package entries.
///
/// `close` must be called exactly once, after the last write; it consumes
/// the writer so nothing can be written afterwards.
pub trait ArchiveWriter {
    /// Add an entry, replacing any earlier entry with the same path.
    fn write(&mut self, path: &str, content: &[u8]) -> Result<()>;

    /// Add an entry holding the raw bytes of `source`.
    fn write_file(&mut self, path: &str, source: &Path) -> Result<()> {
        let content = fs::read(source).map_err(|err| PackagerError::io(source, err))?;
        self.write(path, &content)
    }

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Entries held in memory, in first-write order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(path, _)| path.as_str()).collect()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == path)
            .map(|(_, content)| content.as_slice())
    }

    /// Entry content as text, if present and valid UTF-8
    pub fn get_text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    fn put(&mut self, path: &str, content: &[u8]) {
        match self.entries.iter_mut().find(|(entry, _)| entry == path) {
            Some((_, existing)) => *existing = content.to_vec(),
            None => self.entries.push((path.to_string(), content.to_vec())),
        }
    }
}

impl ArchiveWriter for MemoryArchive {
    fn write(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.put(path, content);
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Writes an XPI (zip) package.
///
/// Entries are buffered and the file is only created on `close`, so a run
/// that fails midway leaves no half-written package behind.
#[derive(Debug)]
pub struct XpiWriter {
    path: PathBuf,
    entries: MemoryArchive,
    compression: CompressionMethod,
}

impl XpiWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: MemoryArchive::new(),
            compression: CompressionMethod::Deflated,
        }
    }

    /// Store entries uncompressed instead of deflating them
    pub fn stored(mut self) -> Self {
        self.compression = CompressionMethod::Stored;
        self
    }
}

impl ArchiveWriter for XpiWriter {
    fn write(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.entries.put(path, content);
        Ok(())
    }

    fn close(self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| PackagerError::io(parent, err))?;
        }

        let file = File::create(&self.path).map_err(|err| PackagerError::io(&self.path, err))?;
        let mut zip = ZipWriter::new(file);

        let options = FileOptions::default()
            .compression_method(self.compression)
            .unix_permissions(0o644);

        for (name, content) in self.entries.entries() {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)
                .map_err(|err| PackagerError::io(&self.path, err))?;
        }

        zip.finish()?;
        Ok(())
    }
}
