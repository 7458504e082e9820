//! Text encoding detection and conversion for file contents.

use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use encoding_rs::UTF_16BE;
use encoding_rs::UTF_16LE;
use log::warn;

use crate::errors::Error;

/// Looks up an encoding by its WHATWG label (`"utf-8"`, `"latin1"`, ...).
pub fn for_label(label: &str) -> Result<&'static Encoding, Error> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| Error::InvalidArgument(format!("Unknown encoding: {label}")))
}

/// Detects the encoding of `bytes`.
///
/// A byte order mark wins, then valid UTF-8; anything else, and empty
/// content, gets `default`.
pub fn detect(bytes: &[u8], default: &'static Encoding) -> &'static Encoding {
    if bytes.is_empty() {
        return default;
    }
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    default
}

/// Decodes `bytes`, dropping a byte order mark. Malformed sequences become
/// U+FFFD.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("malformed {} sequences replaced", used.name());
    }
    text.into_owned()
}

/// Encodes `text`. UTF-16 is written with a byte order mark when `with_bom`
/// is set so that it is detected again on the next read.
pub fn encode(text: &str, encoding: &'static Encoding, with_bom: bool) -> Vec<u8> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let little = encoding == UTF_16LE;
        let mut out = Vec::with_capacity(text.len() * 2 + 2);
        if with_bom {
            let bom: [u8; 2] = if little { [0xFF, 0xFE] } else { [0xFE, 0xFF] };
            out.extend_from_slice(&bom);
        }
        for unit in text.encode_utf16() {
            let bytes = if little {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            out.extend_from_slice(&bytes);
        }
        return out;
    }
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        warn!("characters not representable in {} were replaced", used.name());
    }
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use encoding_rs::WINDOWS_1252;

    use super::*;

    #[test]
    fn empty_content_uses_default() {
        assert_eq!(detect(b"", WINDOWS_1252), WINDOWS_1252);
    }

    #[test]
    fn bom_wins() {
        assert_eq!(detect(&[0xFF, 0xFE, b'a', 0], UTF_8), UTF_16LE);
        assert_eq!(detect(&[0xEF, 0xBB, 0xBF, b'a'], WINDOWS_1252), UTF_8);
    }

    #[test]
    fn valid_utf8_is_detected() {
        assert_eq!(detect("héllo".as_bytes(), WINDOWS_1252), UTF_8);
    }

    #[test]
    fn invalid_utf8_falls_back_to_default() {
        let latin = [b'c', b'a', b'f', 0xE9];
        assert_eq!(detect(&latin, WINDOWS_1252), WINDOWS_1252);
        assert_eq!(decode(&latin, WINDOWS_1252), "café");
    }

    #[test]
    fn utf16_survives_a_round_trip() {
        let bytes = encode("grüße", UTF_16BE, true);
        assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
        let detected = detect(&bytes, UTF_8);
        assert_eq!(detected, UTF_16BE);
        assert_eq!(decode(&bytes, detected), "grüße");
    }

    #[test]
    fn labels_resolve() {
        assert_eq!(for_label("latin1").unwrap(), WINDOWS_1252);
        assert!(for_label("nope").is_err());
    }
}
