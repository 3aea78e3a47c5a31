use crate::error::{Error, Result};

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;
const TB: u64 = 1 << 40;
const PB: u64 = 1 << 50;

///
/// Parses a human-readable size expression into a byte count.
///
/// Accepts a decimal number followed by an optional, case-insensitive unit
/// (`b`, `kb`, `mb`, `gb`, `tb`, `pb`). Units are binary multiples and
/// fractional results are rounded down.
///
/// ## Examples
///
/// ```
/// assert_eq!(chunkhead::parse_size("4mb").unwrap(), 4 * 1024 * 1024);
/// assert_eq!(chunkhead::parse_size("1.5 KB").unwrap(), 1536);
/// assert_eq!(chunkhead::parse_size("42").unwrap(), 42);
/// ```
///
/// ## Errors
///
/// * `Error::NegativeAmount` if the expression is below zero.
/// * `Error::InvalidSize` if the expression is malformed or overflows `u64`.
///
pub fn parse_size(expr: &str) -> Result<u64> {
    let invalid = || Error::InvalidSize(expr.to_string());

    let trimmed = expr.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kb" => KB,
        "mb" => MB,
        "gb" => GB,
        "tb" => TB,
        "pb" => PB,
        _ => return Err(invalid()),
    };

    let (negative, digits) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid());
    }

    let bytes = if digits.contains('.') {
        let value: f64 = digits.parse().map_err(|_| invalid())?;
        let scaled = (value * multiplier as f64).floor();
        if !scaled.is_finite() || scaled >= u64::MAX as f64 {
            return Err(invalid());
        }
        scaled as u64
    } else {
        digits
            .parse::<u64>()
            .ok()
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(invalid)?
    };

    if negative && bytes > 0 {
        return Err(Error::NegativeAmount(
            i64::try_from(bytes).map_or(i64::MIN, |b| -b),
        ));
    }

    Ok(bytes)
}

/// Anything that can be resolved to a forward byte count.
///
/// Implemented for the primitive integers and for size expressions
/// (`&str`, `String`), see [`parse_size`].
pub trait ByteAmount {
    fn byte_count(self) -> Result<u64>;
}

macro_rules! unsigned_amount {
    ($($t:ty),*) => {
        $(
            impl ByteAmount for $t {
                #[inline]
                fn byte_count(self) -> Result<u64> {
                    Ok(self as u64)
                }
            }
        )*
    };
}

macro_rules! signed_amount {
    ($($t:ty),*) => {
        $(
            impl ByteAmount for $t {
                #[inline]
                fn byte_count(self) -> Result<u64> {
                    u64::try_from(self).map_err(|_| Error::NegativeAmount(self as i64))
                }
            }
        )*
    };
}

unsigned_amount!(u8, u16, u32, u64, usize);
signed_amount!(i8, i16, i32, i64, isize);

impl ByteAmount for &str {
    fn byte_count(self) -> Result<u64> {
        parse_size(self)
    }
}

impl ByteAmount for &String {
    fn byte_count(self) -> Result<u64> {
        parse_size(self)
    }
}

impl ByteAmount for String {
    fn byte_count(self) -> Result<u64> {
        parse_size(&self)
    }
}
