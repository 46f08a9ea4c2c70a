/*!
Small parsing helpers that work directly on ASCII bytes.

Parsing a number here never allocates, never accepts a sign or surrounding
whitespace, and reports failures with [`ParseIntError`], which the crate
error type classifies as a parse error.
*/

use crate::{error::Error, util::escape::Byte};

/// An error that occurs when a sequence of ASCII digits could not be turned
/// into an integer.
#[derive(Clone, Debug)]
pub(crate) enum ParseIntError {
    Empty,
    InvalidDigit { byte: u8 },
    Overflow,
    TooManyFractionDigits { len: usize },
}

impl core::fmt::Display for ParseIntError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ParseIntError::*;

        match *self {
            Empty => f.write_str("invalid number, no digits found"),
            InvalidDigit { byte } => write!(
                f,
                "invalid digit, expected 0-9 but got `{}`",
                Byte(byte),
            ),
            Overflow => {
                f.write_str("number too big to fit in a 64-bit integer")
            }
            TooManyFractionDigits { len } => write!(
                f,
                "fractional second has {len} digits, but at most \
                 9 digits (nanosecond precision) are supported",
            ),
        }
    }
}

/// Parses an unsigned integer made up entirely of ASCII digits.
#[inline(always)]
pub(crate) fn i64(bytes: &[u8]) -> Result<i64, Error> {
    if bytes.is_empty() {
        return Err(Error::parse_int(ParseIntError::Empty));
    }
    let mut n: i64 = 0;
    for &byte in bytes {
        let digit = match byte.checked_sub(b'0') {
            Some(digit) if digit <= 9 => i64::from(digit),
            _ => {
                return Err(Error::parse_int(ParseIntError::InvalidDigit {
                    byte,
                }))
            }
        };
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| Error::parse_int(ParseIntError::Overflow))?;
    }
    Ok(n)
}

/// Parses the digits following a decimal separator into a number of
/// nanoseconds.
///
/// For example, `5` becomes `500_000_000` and `000000001` becomes `1`. At
/// least one and at most nine digits are accepted.
pub(crate) fn fraction(bytes: &[u8]) -> Result<i32, Error> {
    const MAX_DIGITS: usize = 9;

    if bytes.len() > MAX_DIGITS {
        return Err(Error::parse_int(ParseIntError::TooManyFractionDigits {
            len: bytes.len(),
        }));
    }
    let mut nanos = i64(bytes)?;
    for _ in bytes.len()..MAX_DIGITS {
        nanos *= 10;
    }
    // At most 9 digits, so this is at most 999_999_999.
    Ok(nanos as i32)
}

/// Returns the longest prefix of `input` containing only ASCII digits,
/// along with whatever follows it.
pub(crate) fn digits(input: &[u8]) -> (&[u8], &[u8]) {
    let len = input.iter().take_while(|b| b.is_ascii_digit()).count();
    input.split_at(len)
}

/// Splits `input` at `at`, returning `None` when it is too short.
pub(crate) fn split(input: &[u8], at: usize) -> Option<(&[u8], &[u8])> {
    if at > input.len() {
        None
    } else {
        Some(input.split_at(at))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn parse_i64() {
        assert_eq!(i64(b"0").unwrap(), 0);
        assert_eq!(i64(b"2024").unwrap(), 2024);
        assert_eq!(i64(b"0009").unwrap(), 9);
        assert_eq!(i64(b"9223372036854775807").unwrap(), i64::MAX);

        let err = i64(b"").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.to_string(), "invalid number, no digits found");
        let err = i64(b"12a").unwrap_err();
        assert_eq!(err.to_string(), "invalid digit, expected 0-9 but got `a`");
        assert!(i64(b"-1").is_err());
        assert!(i64(b"9223372036854775808").is_err());
    }

    #[test]
    fn parse_fraction() {
        assert_eq!(fraction(b"5").unwrap(), 500_000_000);
        assert_eq!(fraction(b"123456").unwrap(), 123_456_000);
        assert_eq!(fraction(b"000000001").unwrap(), 1);
        assert_eq!(fraction(b"999999999").unwrap(), 999_999_999);
        assert!(fraction(b"").is_err());
        assert!(fraction(b"1234567890").unwrap_err().is_parse());
    }

    #[test]
    fn split_digits() {
        assert_eq!(digits(b"2024-01"), (&b"2024"[..], &b"-01"[..]));
        assert_eq!(digits(b"-01"), (&b""[..], &b"-01"[..]));
        assert_eq!(split(b"abc", 2), Some((&b"ab"[..], &b"c"[..])));
        assert_eq!(split(b"abc", 3), Some((&b"abc"[..], &b""[..])));
        assert_eq!(split(b"abc", 4), None);
    }
}
