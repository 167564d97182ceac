//! Byte/hex codec with strict decoding.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("hex input has odd length {0}")]
    OddLength(usize),
    #[error("invalid hex digit {digit:?} at offset {offset}")]
    InvalidDigit { digit: char, offset: usize },
}

/// Render bytes as lowercase hex.
pub fn hex_dump(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Strict inverse of [`hex_dump`]: rejects odd lengths and non-hex digits.
pub fn un_hex_dump(input: &str) -> Result<Vec<u8>, HexError> {
    hex::decode(input).map_err(|err| match err {
        hex::FromHexError::OddLength => HexError::OddLength(input.len()),
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidDigit {
            digit: c,
            offset: index,
        },
        hex::FromHexError::InvalidStringLength => HexError::OddLength(input.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dump_is_lowercase() {
        assert_eq!(hex_dump(&[0xDE, 0xAD, 0xBE, 0xEF]), "deadbeef");
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(un_hex_dump("abc"), Err(HexError::OddLength(3)));
        assert_eq!(
            un_hex_dump("zz"),
            Err(HexError::InvalidDigit {
                digit: 'z',
                offset: 0
            })
        );
    }

    proptest! {
        #[test]
        fn round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(un_hex_dump(&hex_dump(&bytes)).unwrap(), bytes);
        }
    }
}
