//! Parsing of duration strings as written in resource configuration.

use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// The input was empty.
    Empty,
    /// The input started with `-`.
    Negative,
    /// A component had a unit but no digits before it.
    MissingNumber,
    /// A component had digits but no unit after them.
    MissingUnit,
    /// The unit suffix is not one of `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
    UnknownUnit(String),
    /// The value exceeds `u64::MAX` nanoseconds.
    Overflow,
    /// The value parsed to zero where a positive duration is required.
    Zero,
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty duration"),
            Self::Negative => write!(f, "negative durations are not allowed"),
            Self::MissingNumber => write!(f, "expected a number before the unit"),
            Self::MissingUnit => write!(f, "missing unit (expected e.g. 30s, 5m, 1h)"),
            Self::UnknownUnit(unit) => write!(f, "unknown unit {:?}", unit),
            Self::Overflow => write!(f, "duration out of range"),
            Self::Zero => write!(f, "duration must be greater than zero"),
        }
    }
}

impl std::error::Error for DurationParseError {}

/// Parse a duration such as `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// The input is a sequence of decimal numbers, each with an optional
/// fraction and a unit suffix. Valid units are `ns`, `us` (or `µs`), `ms`,
/// `s`, `m` and `h`. The bare string `"0"` is accepted as zero. The total
/// must fit in `u64` nanoseconds (about 584 years).
///
/// # Examples
///
/// ```rust
/// use slackwater::timeout::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
/// assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
/// assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let mut rest = match input.strip_prefix('+') {
        Some(unsigned) => unsigned,
        None if input.starts_with('-') => return Err(DurationParseError::Negative),
        None => input,
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(tail) => {
                let frac_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                tail.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationParseError::MissingNumber);
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit);
        }
        let scale =
            unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit(unit.to_string()))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| DurationParseError::Overflow)?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or(DurationParseError::Overflow)?;

        // Digits past the unit's nanosecond precision are dropped.
        let mut place = scale;
        for digit in frac_part.bytes() {
            place /= 10;
            if place == 0 {
                break;
            }
            nanos += u128::from(digit - b'0') * place;
        }

        total = total
            .checked_add(nanos)
            .ok_or(DurationParseError::Overflow)?;
        rest = tail;
    }

    let nanos = u64::try_from(total).map_err(|_| DurationParseError::Overflow)?;
    Ok(Duration::from_nanos(nanos))
}

/// Parse a duration that must be strictly positive.
pub(crate) fn parse_positive_duration(input: &str) -> Result<Duration, DurationParseError> {
    match parse_duration(input)? {
        d if d.is_zero() => Err(DurationParseError::Zero),
        d => Ok(d),
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        // U+00B5 micro sign and U+03BC Greek mu both show up in the wild.
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("15ns"), Ok(Duration::from_nanos(15)));
        assert_eq!(parse_duration("20us"), Ok(Duration::from_micros(20)));
        assert_eq!(parse_duration("20µs"), Ok(Duration::from_micros(20)));
        assert_eq!(parse_duration("300ms"), Ok(Duration::from_millis(300)));
        assert_eq!(parse_duration("45s"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("3h"), Ok(Duration::from_secs(3 * 3600)));
    }

    #[test]
    fn parses_compound_and_fractional_values() {
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2h45m10s"), Ok(Duration::from_secs(9910)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration(".5s"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("1.s"), Ok(Duration::from_secs(1)));
        assert_eq!(parse_duration("+5m"), Ok(Duration::from_secs(300)));
    }

    #[test]
    fn accepts_bare_zero() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("0s"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert_eq!(parse_duration("10"), Err(DurationParseError::MissingUnit));
        assert_eq!(parse_duration("-1m"), Err(DurationParseError::Negative));
        assert_eq!(parse_duration("m"), Err(DurationParseError::MissingNumber));
        assert_eq!(parse_duration("."), Err(DurationParseError::MissingNumber));
        assert_eq!(
            parse_duration("5 minutes"),
            Err(DurationParseError::UnknownUnit(" minutes".to_string()))
        );
        assert_eq!(
            parse_duration("3d"),
            Err(DurationParseError::UnknownUnit("d".to_string()))
        );
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(
            parse_duration("99999999999999999999999999999999999999999h"),
            Err(DurationParseError::Overflow)
        );
    }

    #[test]
    fn rejects_values_beyond_u64_nanos() {
        assert_eq!(
            parse_duration("5000000000000000h"),
            Err(DurationParseError::Overflow)
        );
        assert_eq!(
            parse_duration("18446744073709551615ns"),
            Ok(Duration::from_nanos(u64::MAX))
        );
        assert_eq!(
            parse_duration("18446744073709551616ns"),
            Err(DurationParseError::Overflow)
        );
    }

    #[test]
    fn positive_parser_rejects_zero() {
        assert_eq!(parse_positive_duration("0"), Err(DurationParseError::Zero));
        assert_eq!(parse_positive_duration("0s"), Err(DurationParseError::Zero));
        assert_eq!(
            parse_positive_duration("1s"),
            Ok(Duration::from_secs(1))
        );
    }
}
