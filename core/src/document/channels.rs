//! Dual-channel embedding: zero-width Unicode codepoints spliced after
//! alphanumeric glyphs, and per-paragraph line-spacing adjustment.

/// Zero-width space: marks bit 0 in the Unicode channel.
const ZWSP: char = '\u{200B}';
/// Zero-width non-joiner: marks bit 1 in the Unicode channel.
const ZWNJ: char = '\u{200C}';

/// A structured text document: an ordered list of non-empty paragraphs.
/// Binary container parsing (PDF/DOCX) is delegated to
/// [`crate::document::codec::DocumentCodec`]; this type only models the
/// plain-text content that carries the watermark.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextDocument {
    pub paragraphs: Vec<String>,
}

impl TextDocument {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self {
            paragraphs: paragraphs.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Total count of alphanumeric glyphs across all paragraphs, the
    /// Unicode channel's carrying capacity.
    pub fn alnum_glyph_count(&self) -> usize {
        self.paragraphs
            .iter()
            .flat_map(|p| p.chars())
            .filter(|c| c.is_alphanumeric())
            .count()
    }
}

/// Per-paragraph line-spacing multiplier carrying the layout channel.
pub type LineSpacing = Vec<f32>;

/// Splices a zero-width marker after every alphanumeric glyph, consuming
/// `bits` in order. Stops inserting once `bits` is exhausted; remaining
/// text is left untouched.
pub fn embed_unicode_channel(paragraphs: &[String], bits: &[u8]) -> Vec<String> {
    let mut cursor = 0usize;
    paragraphs
        .iter()
        .map(|paragraph| {
            let mut out = String::with_capacity(paragraph.len() + bits.len());
            for ch in paragraph.chars() {
                out.push(ch);
                if ch.is_alphanumeric() && cursor < bits.len() {
                    out.push(if bits[cursor] == 1 { ZWNJ } else { ZWSP });
                    cursor += 1;
                }
            }
            out
        })
        .collect()
}

/// Scans paragraphs for `ZWSP`/`ZWNJ` markers, returning the recovered
/// bit sequence in encounter order.
pub fn extract_unicode_channel(paragraphs: &[String]) -> Vec<u8> {
    paragraphs
        .iter()
        .flat_map(|p| p.chars())
        .filter_map(|c| match c {
            ZWSP => Some(0u8),
            ZWNJ => Some(1u8),
            _ => None,
        })
        .collect()
}

/// Produces one line-spacing value per non-empty paragraph: `1.1` for bit
/// 1, `1.0` for bit 0. Paragraphs past the end of `bits` get the default
/// `1.0` (no signal).
pub fn embed_layout_channel(paragraph_count: usize, bits: &[u8]) -> LineSpacing {
    (0..paragraph_count)
        .map(|i| match bits.get(i) {
            Some(1) => 1.1,
            _ => 1.0,
        })
        .collect()
}

/// Recovers a bit per paragraph from its line-spacing value: anything
/// closer to `1.1` than `1.0` decodes as bit 1.
pub fn extract_layout_channel(line_spacing: &LineSpacing) -> Vec<u8> {
    line_spacing
        .iter()
        .map(|&s| if s >= 1.05 { 1u8 } else { 0u8 })
        .collect()
}

/// Element-wise OR-merge of the two recovered channels, up to the
/// shorter length (recovery-favoring: either channel asserting 1 wins).
pub fn merge_or(unicode_bits: &[u8], layout_bits: &[u8]) -> Vec<u8> {
    let len = unicode_bits.len().min(layout_bits.len());
    (0..len)
        .map(|i| if unicode_bits[i] == 1 || layout_bits[i] == 1 { 1 } else { 0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_channel_roundtrips() {
        let paragraphs = vec!["hello world".to_string(), "second paragraph here".to_string()];
        let bits: Vec<u8> = (0..40).map(|i| (i % 3 == 0) as u8).collect();
        let embedded = embed_unicode_channel(&paragraphs, &bits);
        let recovered = extract_unicode_channel(&embedded);
        assert_eq!(recovered, bits[..recovered.len()]);
    }

    #[test]
    fn layout_channel_roundtrips() {
        let bits = vec![1u8, 0, 1, 1, 0];
        let spacing = embed_layout_channel(5, &bits);
        let recovered = extract_layout_channel(&spacing);
        assert_eq!(recovered, bits);
    }

    #[test]
    fn layout_channel_defaults_past_bit_length() {
        let spacing = embed_layout_channel(3, &[1]);
        assert_eq!(spacing, vec![1.1, 1.0, 1.0]);
    }

    #[test]
    fn merge_or_favors_either_channel_asserting_one() {
        let unicode = vec![0u8, 1, 0, 0];
        let layout = vec![0u8, 0, 1, 0];
        assert_eq!(merge_or(&unicode, &layout), vec![0, 1, 1, 0]);
    }

    #[test]
    fn text_document_filters_empty_paragraphs() {
        let doc = TextDocument::new(vec!["a".to_string(), "".to_string(), "b".to_string()]);
        assert_eq!(doc.paragraphs.len(), 2);
    }
}
