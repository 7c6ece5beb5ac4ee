//! Length-prefixed byte strings: a varint byte length followed by the raw
//! bytes, verbatim. No null terminator, no charset conversion.

use super::varint::{decode_u64, encode_u64, encoded_len};
use crate::coder::Coder;
use crate::error::DaemonClientError;

/// Appends the length-prefixed encoding of `s` to `buf`.
pub fn encode_str(s: &str, buf: &mut Vec<u8>) {
    encode_u64(s.len() as u64, buf);
    buf.extend_from_slice(s.as_bytes());
}

/// Decodes a length-prefixed UTF-8 string from the front of `buf`.
pub fn decode_string(buf: &mut &[u8]) -> Result<String, DaemonClientError> {
    let len = decode_u64(buf)? as usize;
    if buf.len() < len {
        return Err(DaemonClientError::Varint("string length exceeds buffer"));
    }
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    String::from_utf8(head.to_vec())
        .map_err(|_| DaemonClientError::Varint("string is not valid utf-8"))
}

/// Wire size of `s` once length-prefixed.
pub fn encoded_len_str(s: &str) -> usize {
    encoded_len(s.len() as u64) + s.len()
}

impl Coder for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        encode_str(self, buf);
    }

    fn decode(buf: &mut &[u8]) -> Result<Self, DaemonClientError> {
        decode_string(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_string_is_single_zero_byte() {
        let mut buf = Vec::new();
        encode_str("", &mut buf);
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn test_string_roundtrip() {
        for s in ["", "a", "route", "\u{1F980}crab"] {
            let mut buf = Vec::new();
            encode_str(s, &mut buf);
            assert_eq!(buf.len(), encoded_len_str(s));
            let mut slice = buf.as_slice();
            let decoded = decode_string(&mut slice).unwrap();
            assert_eq!(decoded, s);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn test_known_encoding() {
        let mut buf = Vec::new();
        encode_str("requests", &mut buf);
        assert_eq!(
            buf,
            vec![0x08, b'r', b'e', b'q', b'u', b'e', b's', b't', b's']
        );
    }
}
