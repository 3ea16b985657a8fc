//! Allocation-free decimal integer parsing and formatting.

use thiserror::Error;

use crate::config::MAX_INTEGER_DIGITS;

/// Largest decimal representation of an `i64`, including the sign.
pub(crate) const MAX_INT_TEXT_LEN: usize = MAX_INTEGER_DIGITS + 1;

/// Failure modes of [`parse_i64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntError {
    /// The span was empty or held only a sign.
    #[error("no digits")]
    Empty,

    /// A byte other than an ASCII digit was found.
    #[error("invalid digit at index {index}")]
    InvalidDigit {
        /// Index of the offending byte in the span.
        index: usize,
    },

    /// More than 19 digits.
    #[error("more than 19 digits")]
    TooManyDigits,

    /// The value lies outside the `i64` range.
    #[error("value does not fit in a signed 64-bit integer")]
    Overflow,
}

/// Parses an optionally negative decimal number.
///
/// Digits are accumulated towards the sign of the input, so `i64::MIN` is
/// reachable without a wider intermediate type. No whitespace or `+` sign is
/// accepted.
///
/// # Examples
///
/// ```
/// use rbencode::{parse_i64, IntError};
///
/// assert_eq!(parse_i64(b"-9223372036854775808"), Ok(i64::MIN));
/// assert_eq!(parse_i64(b"9223372036854775808"), Err(IntError::Overflow));
/// assert_eq!(parse_i64(b"-"), Err(IntError::Empty));
/// ```
pub fn parse_i64(span: &[u8]) -> Result<i64, IntError> {
    let (negative, digits) = match span.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some(_) => (false, span),
        None => return Err(IntError::Empty),
    };

    if digits.is_empty() {
        return Err(IntError::Empty);
    }
    let offset = span.len() - digits.len();
    if let Some(index) = digits.iter().position(|b| !b.is_ascii_digit()) {
        return Err(IntError::InvalidDigit {
            index: index + offset,
        });
    }
    if digits.len() > MAX_INTEGER_DIGITS {
        return Err(IntError::TooManyDigits);
    }

    let mut result: i64 = 0;
    for &b in digits {
        let digit = i64::from(b - b'0');
        let shifted = result.checked_mul(10).ok_or(IntError::Overflow)?;
        result = if negative {
            shifted.checked_sub(digit)
        } else {
            shifted.checked_add(digit)
        }
        .ok_or(IntError::Overflow)?;
    }

    Ok(result)
}

/// Number of decimal digits in `n`.
pub(crate) fn digit_count(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Length of the decimal text of `n`, including a leading `-`.
pub(crate) fn int_text_len(n: i64) -> usize {
    digit_count(n.unsigned_abs()) + usize::from(n < 0)
}

/// Writes the decimal text of `n` into the tail of `buf` and returns it.
pub(crate) fn format_i64(buf: &mut [u8; MAX_INT_TEXT_LEN], n: i64) -> &[u8] {
    let mut magnitude = n.unsigned_abs();
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    if n < 0 {
        start -= 1;
        buf[start] = b'-';
    }
    &buf[start..]
}
