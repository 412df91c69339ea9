use crate::prelude::{StageError, StageResult};
use log::debug;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

/// Local file header signature of a zip archive.
pub const ARCHIVE_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

const BOM: char = '\u{feff}';

/// Decodes a telemetry container into raw record lines.
pub struct RecordReader;

impl RecordReader {
    /// Reads the whole container at `path`. Plain text and single-member
    /// archives are both accepted.
    pub fn read_path<P: AsRef<Path>>(path: P) -> StageResult<Vec<String>> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        if bytes.starts_with(&ARCHIVE_SIGNATURE) {
            debug!("{} is an archive container", path.display());
        }
        Self::read_bytes(&bytes)
    }

    /// Decodes an in-memory container.
    pub fn read_bytes(bytes: &[u8]) -> StageResult<Vec<String>> {
        let text = if bytes.starts_with(&ARCHIVE_SIGNATURE) {
            Self::first_member(bytes)?
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        };
        Ok(Self::split_lines(&text))
    }

    fn first_member(bytes: &[u8]) -> StageResult<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        if archive.len() == 0 {
            return Err(StageError::EmptyArchive);
        }
        let mut member = archive.by_index(0)?;
        // The header's size is untrusted; let the buffer grow with real data.
        let mut raw = Vec::new();
        member.read_to_end(&mut raw)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Splits decoded text into lines, dropping byte-order marks, blank
    /// lines and `//` comments.
    pub fn split_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(|line| line.trim_start_matches(BOM))
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(str::to_owned)
            .collect()
    }
}
