//! Forgiving decoders for base64 and hex text.
//!
//! Text handed to a buffer is decoded on a best-effort basis: foreign
//! characters are skipped (base64) or end the input (hex) instead of failing
//! the whole conversion. The bit-level work is delegated to the `base64` and
//! `hex` crates; this module only normalizes the input they receive.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Decoder accepting unpadded input and non-zero trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes base64 text, accepting both the standard and URL-safe alphabets.
///
/// Characters outside either alphabet are ignored and decoding stops at the
/// first `=`. A dangling single character carries too few bits for a byte
/// and is dropped.
pub(crate) fn decode_base64(text: &str) -> Vec<u8> {
    let mut normalized: Vec<u8> = text
        .bytes()
        .take_while(|&b| b != b'=')
        .filter_map(|b| match b {
            b'-' => Some(b'+'),
            b'_' => Some(b'/'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => Some(b),
            _ => None,
        })
        .collect();
    if normalized.len() % 4 == 1 {
        normalized.pop();
    }
    LENIENT.decode(&normalized).unwrap_or_default()
}

/// Encodes bytes as padded standard base64
pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decodes hex pairs into `dst` until the first invalid pair, a trailing odd
/// nibble, or a full destination. Returns the number of bytes written.
pub(crate) fn decode_hex_into(text: &str, dst: &mut [u8]) -> usize {
    let digits = text.bytes().take_while(u8::is_ascii_hexdigit).count();
    let pairs = (digits / 2).min(dst.len());
    match hex::decode_to_slice(&text.as_bytes()[..pairs * 2], &mut dst[..pairs]) {
        Ok(()) => pairs,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_base64_standard() {
        assert_eq!(decode_base64("aGVsbG8="), b"hello".to_vec());
        assert_eq!(decode_base64("aGVsbG8"), b"hello".to_vec());
    }

    #[test]
    fn test_decode_base64_url_safe() {
        assert_eq!(decode_base64("-_8"), vec![0xFB, 0xFF]);
        assert_eq!(decode_base64("+/8="), vec![0xFB, 0xFF]);
    }

    #[test]
    fn test_decode_base64_skips_noise() {
        assert_eq!(decode_base64("aG Vs\nbG8="), b"hello".to_vec());
        assert_eq!(decode_base64("aGk=trailing"), b"hi".to_vec());
    }

    #[test]
    fn test_decode_base64_dangling_char() {
        assert_eq!(decode_base64("aGVsb"), b"hel".to_vec());
        assert_eq!(decode_base64("a"), Vec::<u8>::new());
    }

    #[test]
    fn test_encode_base64() {
        assert_eq!(encode_base64(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn test_decode_hex_into() {
        let mut dst = [0u8; 4];
        assert_eq!(decode_hex_into("deadbeef", &mut dst), 4);
        assert_eq!(dst, [0xDE, 0xAD, 0xBE, 0xEF]);

        let mut dst = [0u8; 4];
        assert_eq!(decode_hex_into("abcz12", &mut dst), 1);
        assert_eq!(dst[0], 0xAB);

        assert_eq!(decode_hex_into("abc", &mut [0u8; 4]), 1);
        assert_eq!(decode_hex_into("zz", &mut [0u8; 4]), 0);
        assert_eq!(decode_hex_into("aabbcc", &mut [0u8; 2]), 2);
    }
}
