//! Document container port (C7): abstracts binary PDF/DOCX (de)serialization
//! away from the cryptographic and bit-level logic under test.
//!
//! Real PDF/DOCX byte-level parsing is out of scope for this crate and
//! would be a separate adapter crate. The in-repo [`PlainTextDocumentCodec`]
//! models a document as plain UTF-8 text with paragraphs separated by
//! blank lines and each line tagged with its line-spacing multiplier, and
//! uses a uniquely named scratch file per call (never reusing a path) to
//! exercise the same "external collaborator may use a scratch directory"
//! contract a real container adapter would.

use std::io::{Read, Write};

use crate::document::channels::{LineSpacing, TextDocument};
use crate::error::CoreError;

/// Abstract container codec for structured text documents.
pub trait DocumentCodec: Send + Sync {
    /// Parses raw document bytes into a [`TextDocument`] plus the
    /// per-paragraph line-spacing channel recovered alongside it.
    fn parse(&self, bytes: &[u8]) -> Result<(TextDocument, LineSpacing), CoreError>;

    /// Serializes a [`TextDocument`] plus its per-paragraph line-spacing
    /// channel back into document bytes.
    fn serialize(&self, doc: &TextDocument, line_spacing: &LineSpacing) -> Result<Vec<u8>, CoreError>;
}

/// Plain-text adapter used by the demo gateway and tests.
///
/// Its on-disk line format is `"<spacing>\t<paragraph text>"`, one
/// paragraph per line; this is a deliberately simple stand-in for the
/// layout metadata a real word-processing or PDF format would carry
/// natively.
#[derive(Default)]
pub struct PlainTextDocumentCodec;

impl PlainTextDocumentCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for PlainTextDocumentCodec {
    fn parse(&self, bytes: &[u8]) -> Result<(TextDocument, LineSpacing), CoreError> {
        let text = std::str::from_utf8(bytes).map_err(|_| CoreError::BadUtf8)?;
        let mut paragraphs = Vec::new();
        let mut spacing = Vec::new();
        for line in text.lines() {
            if let Some((spacing_str, body)) = line.split_once('\t') {
                if body.is_empty() {
                    continue;
                }
                let s: f32 = spacing_str.parse().unwrap_or(1.0);
                paragraphs.push(body.to_string());
                spacing.push(s);
            }
        }
        Ok((TextDocument::new(paragraphs), spacing))
    }

    fn serialize(&self, doc: &TextDocument, line_spacing: &LineSpacing) -> Result<Vec<u8>, CoreError> {
        let mut scratch = tempfile::NamedTempFile::new()
            .map_err(|e| CoreError::Encode(format!("failed to create scratch file: {e}")))?;

        for (i, paragraph) in doc.paragraphs.iter().enumerate() {
            let spacing = line_spacing.get(i).copied().unwrap_or(1.0);
            writeln!(scratch, "{spacing}\t{paragraph}")
                .map_err(|e| CoreError::Encode(format!("failed to write scratch file: {e}")))?;
        }
        scratch
            .flush()
            .map_err(|e| CoreError::Encode(format!("failed to flush scratch file: {e}")))?;

        let mut file = scratch
            .reopen()
            .map_err(|e| CoreError::Encode(format!("failed to reopen scratch file: {e}")))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| CoreError::Encode(format!("failed to read scratch file: {e}")))?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_then_parse_roundtrips_paragraphs() {
        let codec = PlainTextDocumentCodec::new();
        let doc = TextDocument::new(vec!["first paragraph".to_string(), "second one".to_string()]);
        let spacing = vec![1.0, 1.1];

        let bytes = codec.serialize(&doc, &spacing).unwrap();
        let (parsed, recovered_spacing) = codec.parse(&bytes).unwrap();

        assert_eq!(parsed.paragraphs, doc.paragraphs);
        assert_eq!(recovered_spacing, spacing);
    }

    #[test]
    fn parse_rejects_invalid_utf8() {
        let codec = PlainTextDocumentCodec::new();
        let bytes = vec![0xFF, 0xFE, 0xFD];
        assert!(matches!(codec.parse(&bytes), Err(CoreError::BadUtf8)));
    }
}
