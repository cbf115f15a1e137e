//! Code archiving for deployable bundles.

use std::fs::File;
use std::io::Read;
use tempfile::TempDir;
use tracing::debug;
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

use crate::error::Result;

/// Name of the single entry inside the archive; must match the default
/// `index.handler` entry point.
pub const ENTRY_FILE: &str = "index.js";

/// Packages a source string into a single-entry deployable zip archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Archiver;

impl Archiver {
    /// Create a new archiver.
    pub fn new() -> Self {
        Self
    }

    /// Pack `source` as `index.js` inside a zip archive and return the
    /// archive bytes.
    ///
    /// The staging directory is removed when the guard drops, on success
    /// and on error alike. Compression failures are fatal and propagated.
    pub fn pack(&self, source: &str) -> Result<Vec<u8>> {
        let staging = TempDir::new()?;

        let entry_path = staging.path().join(ENTRY_FILE);
        std::fs::write(&entry_path, source)?;

        let archive_path = staging.path().join("function.zip");
        let mut zip = ZipWriter::new(File::create(&archive_path)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(ENTRY_FILE, options)?;
        let mut entry = File::open(&entry_path)?;
        std::io::copy(&mut entry, &mut zip)?;
        zip.finish()?;

        let mut bytes = Vec::new();
        File::open(&archive_path)?.read_to_end(&mut bytes)?;

        debug!(size = bytes.len(), "packed code archive");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn pack_produces_zip_with_source_entry() {
        let source = "exports.handler = async () => ({ statusCode: 200 });";
        let bytes = Archiver::new().pack(source).unwrap();

        // Zip local file header magic.
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(ENTRY_FILE).unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, source);
    }

    #[test]
    fn pack_handles_empty_source() {
        let bytes = Archiver::new().pack("").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name(ENTRY_FILE).is_ok());
    }
}
