//! Text decoding and encoding for the text-based formats
//!
//! Decoding honours a byte-order mark over the configured encoding. Both
//! directions are strict: malformed input or characters the target encoding
//! cannot represent are reported instead of being replaced.

use encoding_rs::Encoding;

use crate::format::{FormatError, TextEncoding};

enum Resolved {
    Ascii,
    Utf16Le,
    Utf16Be,
    Other(&'static Encoding),
}

fn resolve(encoding: TextEncoding) -> Result<Resolved, FormatError> {
    Ok(match encoding {
        TextEncoding::Utf8 => Resolved::Other(encoding_rs::UTF_8),
        TextEncoding::Utf16Le => Resolved::Utf16Le,
        TextEncoding::Utf16Be => Resolved::Utf16Be,
        TextEncoding::Ascii => Resolved::Ascii,
        TextEncoding::Codepage(cp) => match cp {
            20127 => Resolved::Ascii,
            1200 => Resolved::Utf16Le,
            1201 => Resolved::Utf16Be,
            other => Resolved::Other(codepage_encoding(other).ok_or_else(|| {
                FormatError::Encoding(format!("unsupported code page {}", other))
            })?),
        },
    })
}

/// Map a Windows code page number onto an `encoding_rs` encoding
pub fn codepage_encoding(codepage: u16) -> Option<&'static Encoding> {
    let encoding = match codepage {
        65001 => encoding_rs::UTF_8,
        874 => encoding_rs::WINDOWS_874,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 | 28591 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        866 => encoding_rs::IBM866,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        20932 | 51932 => encoding_rs::EUC_JP,
        28592 => encoding_rs::ISO_8859_2,
        28593 => encoding_rs::ISO_8859_3,
        28594 => encoding_rs::ISO_8859_4,
        28595 => encoding_rs::ISO_8859_5,
        28596 => encoding_rs::ISO_8859_6,
        28597 => encoding_rs::ISO_8859_7,
        28598 => encoding_rs::ISO_8859_8,
        28603 => encoding_rs::ISO_8859_13,
        28605 => encoding_rs::ISO_8859_15,
        50220 => encoding_rs::ISO_2022_JP,
        54936 => encoding_rs::GB18030,
        _ => return None,
    };
    Some(encoding)
}

/// Label used in document declarations (`<?xml ... encoding="..."?>`)
pub fn label(encoding: TextEncoding) -> String {
    match resolve(encoding) {
        Ok(Resolved::Ascii) => "us-ascii".to_string(),
        Ok(Resolved::Utf16Le) | Ok(Resolved::Utf16Be) => "utf-16".to_string(),
        Ok(Resolved::Other(enc)) => enc.name().to_ascii_lowercase(),
        Err(_) => "utf-8".to_string(),
    }
}

/// Decode file bytes into text
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, FormatError> {
    if let Some((bom_encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(bom_encoding, &bytes[bom_len..]);
    }

    match resolve(encoding)? {
        Resolved::Ascii => {
            if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                return Err(FormatError::Encoding(format!(
                    "non-ASCII byte 0x{:02X} at offset {}",
                    bytes[pos], pos
                )));
            }
            // ASCII is a strict subset of UTF-8, so this cannot fail
            String::from_utf8(bytes.to_vec()).map_err(|e| FormatError::Encoding(e.to_string()))
        }
        Resolved::Utf16Le => decode_with(encoding_rs::UTF_16LE, bytes),
        Resolved::Utf16Be => decode_with(encoding_rs::UTF_16BE, bytes),
        Resolved::Other(enc) => decode_with(enc, bytes),
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, FormatError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(FormatError::Encoding(format!(
            "input is not valid {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// Encode text for writing. UTF-16 output starts with a byte-order mark;
/// UTF-8 output does not.
pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, FormatError> {
    match resolve(encoding)? {
        Resolved::Ascii => {
            if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
                return Err(FormatError::Encoding(format!(
                    "character '{}' cannot be written as ASCII",
                    c
                )));
            }
            Ok(text.as_bytes().to_vec())
        }
        Resolved::Utf16Le => {
            let mut out = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            Ok(out)
        }
        Resolved::Utf16Be => {
            let mut out = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            Ok(out)
        }
        Resolved::Other(enc) if enc == encoding_rs::UTF_8 => Ok(text.as_bytes().to_vec()),
        Resolved::Other(enc) => {
            let (bytes, _, had_unmappable) = enc.encode(text);
            if had_unmappable {
                return Err(FormatError::Encoding(format!(
                    "text contains characters not representable in {}",
                    enc.name()
                )));
            }
            Ok(bytes.into_owned())
        }
    }
}
