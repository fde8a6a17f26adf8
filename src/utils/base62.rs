//! Base62 short code encoding.
//!
//! Short codes are derived from the numeric id the link store assigns, so two
//! links can never share a code. Codes have no fixed width; they grow by one
//! character every time the id crosses a power of 62.

use crate::error::AppError;
use serde_json::json;

/// Digits, then upper case, then lower case.
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = ALPHABET.len() as u64;

/// Encodes a store-assigned identifier as a base62 short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `id` is zero or negative. Identifiers
/// start at 1, so there is no code for zero.
///
/// # Examples
///
/// ```
/// use shortlink_lifecycle::utils::base62::encode;
///
/// assert_eq!(encode(1).unwrap(), "1");
/// assert_eq!(encode(62).unwrap(), "10");
/// assert_eq!(encode(42).unwrap(), "g");
/// ```
pub fn encode(id: i64) -> Result<String, AppError> {
    if id <= 0 {
        return Err(AppError::bad_request(
            "Identifier must be positive",
            json!({ "id": id }),
        ));
    }

    let mut n = id as u64;
    let mut buf = Vec::with_capacity(11);

    while n > 0 {
        buf.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    buf.reverse();

    // ALPHABET is pure ASCII.
    Ok(buf.into_iter().map(char::from).collect())
}

/// Length of the code for `i64::MAX`; no id encodes to anything longer.
pub const MAX_CODE_LEN: usize = 11;

/// Returns true if `code` could have come out of [`encode`]: non-empty, at
/// most [`MAX_CODE_LEN`] characters, all from the base62 alphabet.
///
/// Used to reject obviously foreign codes before touching the store.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encode_single_digit_values() {
        assert_eq!(encode(1).unwrap(), "1");
        assert_eq!(encode(9).unwrap(), "9");
        assert_eq!(encode(10).unwrap(), "A");
        assert_eq!(encode(35).unwrap(), "Z");
        assert_eq!(encode(36).unwrap(), "a");
        assert_eq!(encode(61).unwrap(), "z");
    }

    #[test]
    fn test_encode_grows_with_powers_of_62() {
        assert_eq!(encode(62).unwrap(), "10");
        assert_eq!(encode(62 * 62 - 1).unwrap(), "zz");
        assert_eq!(encode(62 * 62).unwrap(), "100");
    }

    #[test]
    fn test_encode_max_id() {
        let code = encode(i64::MAX).unwrap();
        assert_eq!(code, "AzL8n0Y58m7");
        assert_eq!(code.len(), MAX_CODE_LEN);
    }

    #[test]
    fn test_encode_rejects_zero() {
        let result = encode(0);
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_encode_rejects_negative() {
        assert!(encode(-1).is_err());
        assert!(encode(i64::MIN).is_err());
    }

    #[test]
    fn test_encode_is_deterministic() {
        for id in [1, 42, 9_999, 1_000_000_007] {
            assert_eq!(encode(id).unwrap(), encode(id).unwrap());
        }
    }

    #[test]
    fn test_encode_is_injective() {
        let mut codes = HashSet::new();

        for id in 1..=20_000 {
            assert!(codes.insert(encode(id).unwrap()), "duplicate code for {id}");
        }
    }

    #[test]
    fn test_encoded_codes_are_url_safe() {
        for id in [1, 61, 62, 3843, 238_327, i64::MAX] {
            let code = encode(id).unwrap();
            assert!(is_valid_code(&code));
        }
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("aZ09"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("ab-c"));
        assert!(!is_valid_code("../etc"));
    }

    #[test]
    fn test_is_valid_code_rejects_overlong() {
        assert!(is_valid_code("AzL8n0Y58m7"));
        assert!(!is_valid_code("AzL8n0Y58m7a"));
        assert!(!is_valid_code(&"a".repeat(4096)));
    }
}
