//! Frame wrapping for the document channel: `"WM1|" || len(payload) || "|" || payload`.

use crate::config::DOC_FRAME_MAGIC;
use crate::error::CoreError;

/// Maximum accepted declared payload length, in bytes.
const MAX_PAYLOAD_LEN: usize = 4096;

/// Wraps `payload` (the base64 envelope string) in the `"WM1|len|payload"` frame.
pub fn wrap(payload: &str) -> String {
    format!("{DOC_FRAME_MAGIC}{}|{payload}", payload.len())
}

/// Locates and parses a `"WM1|len|payload"` frame within `text`, validating
/// that the declared length is in range `1..=4096` and matches the
/// recovered payload length.
pub fn find_and_parse(text: &str) -> Result<String, CoreError> {
    let magic_pos = text.find(DOC_FRAME_MAGIC).ok_or(CoreError::NoFrame)?;
    let rest = &text[magic_pos + DOC_FRAME_MAGIC.len()..];

    let sep_pos = rest.find('|').ok_or_else(|| {
        CoreError::BadLength("missing length separator after magic".to_string())
    })?;

    let len_str = &rest[..sep_pos];
    let len: usize = len_str
        .parse()
        .map_err(|_| CoreError::BadLength(format!("non-numeric length: {len_str}")))?;

    if len == 0 || len > MAX_PAYLOAD_LEN {
        return Err(CoreError::BadLength(format!(
            "declared length {len} out of range 1..={MAX_PAYLOAD_LEN}"
        )));
    }

    let payload_start = sep_pos + 1;
    let payload_region = &rest[payload_start..];
    let payload = payload_region.get(..len).ok_or_else(|| {
        CoreError::BadLength(format!(
            "declared length {len} exceeds recovered bytes {} or splits a multi-byte character",
            payload_region.len()
        ))
    })?;

    Ok(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_parse_roundtrips() {
        let framed = wrap("abcdef");
        let recovered = find_and_parse(&framed).unwrap();
        assert_eq!(recovered, "abcdef");
    }

    #[test]
    fn parse_fails_without_magic() {
        let err = find_and_parse("no magic here").unwrap_err();
        assert!(matches!(err, CoreError::NoFrame));
    }

    #[test]
    fn parse_fails_on_zero_length() {
        let err = find_and_parse("WM1|0|").unwrap_err();
        assert!(matches!(err, CoreError::BadLength(_)));
    }

    #[test]
    fn parse_tolerates_leading_noise_before_magic() {
        let framed = format!("garbage-prefix{}", wrap("payload-data"));
        let recovered = find_and_parse(&framed).unwrap();
        assert_eq!(recovered, "payload-data");
    }

    #[test]
    fn parse_rejects_length_that_splits_a_multibyte_char_instead_of_panicking() {
        // "é" is 2 bytes; a declared length of 1 lands inside it.
        let framed = format!("{DOC_FRAME_MAGIC}1|é");
        let err = find_and_parse(&framed).unwrap_err();
        assert!(matches!(err, CoreError::BadLength(_)));
    }
}
