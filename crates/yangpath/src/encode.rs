//! Percent-encoding of list-key values.
//!
//! Key values may contain characters that carry meaning in the path grammar
//! (`/` separates segments, `=` starts a predicate, `,` separates keys). Those
//! bytes are written as `%xx` with lowercase hex, which is what SONiC's
//! RESTCONF server emits and expects (`Eth1/5` becomes `Eth1%2f5`).

use crate::error::{Error, Result};

/// Bytes that must never appear literally inside a key value.
const RESERVED: &[u8] = b"/%,=?#& ";

fn needs_escape(byte: u8) -> bool {
    RESERVED.contains(&byte) || byte.is_ascii_control()
}

/// Percent-encode a key value.
pub fn encode_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii() && needs_escape(ch as u8) {
            out.push_str(&format!("%{:02x}", ch as u8));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode a percent-encoded key value. Accepts upper and lower case hex.
pub fn decode_key(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
            let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => return Err(Error::InvalidEncoding(encoded.to_string())),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| Error::InvalidEncoding(encoded.to_string()))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_interface_name() {
        assert_eq!(encode_key("Eth1/5"), "Eth1%2f5");
        assert_eq!(encode_key("Eth1/5:0"), "Eth1%2f5:0");
        assert_eq!(encode_key("Ethernet0"), "Ethernet0");
    }

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode_key("a,b"), "a%2cb");
        assert_eq!(encode_key("x=y"), "x%3dy");
        assert_eq!(encode_key("50%"), "50%25");
        assert_eq!(encode_key("two words"), "two%20words");
    }

    #[test]
    fn test_decode_accepts_both_cases() {
        assert_eq!(decode_key("Eth1%2f5").unwrap(), "Eth1/5");
        assert_eq!(decode_key("Eth1%2F5").unwrap(), "Eth1/5");
    }

    #[test]
    fn test_decode_rejects_broken_escape() {
        assert!(decode_key("Eth1%2").is_err());
        assert!(decode_key("Eth1%zz5").is_err());
        assert!(decode_key("%").is_err());
    }

    #[test]
    fn test_encode_decode_is_reversible() {
        for value in ["Eth1/5", "PortChannel10", "a%2fb", "x,y=z", "vrf 1", "µ/ü"] {
            assert_eq!(decode_key(&encode_key(value)).unwrap(), value);
        }
    }
}
