use crate::sample::Sample;
use std::fmt;

mod controller;

pub use controller::Controller;

/// Longest accepted record, excluding the line terminator.
pub const MAX_RECORD_LEN: usize = 64;

#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, PartialEq)]
pub enum MalformedRecord {
    TooLong(usize),
    NotUtf8,
    Format(String),
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRecord::TooLong(len) => {
                write!(f, "record of {len} bytes exceeds {MAX_RECORD_LEN} bytes")
            }
            MalformedRecord::NotUtf8 => write!(f, "record is not valid UTF-8"),
            MalformedRecord::Format(record) => {
                write!(f, "expected '<distance> <rssi>', got {record:?}")
            }
        }
    }
}

impl std::error::Error for MalformedRecord {}

/// Parses a `<float> <integer>` record (distance in meters, signal strength in dBm).
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_record(line: &[u8], timestamp_ms: i64) -> Result<Option<Sample>, MalformedRecord> {
    // the cap applies to the record itself, regardless of line ending
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.len() > MAX_RECORD_LEN {
        return Err(MalformedRecord::TooLong(line.len()));
    }

    let line = std::str::from_utf8(line)
        .map_err(|_| MalformedRecord::NotUtf8)?
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let malformed = || MalformedRecord::Format(line.to_string());

    let mut fields = line.split_whitespace();
    let (Some(distance), Some(signal_strength), None) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    let distance = distance
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(malformed)?;
    let signal_strength = signal_strength.parse::<i64>().map_err(|_| malformed())?;

    Ok(Some(Sample::new(
        distance,
        signal_strength as f64,
        timestamp_ms,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_record() {
        assert_eq!(
            Ok(Some(Sample::new(1.25, -67.0, 42))),
            parse_record(b"1.25 -67", 42)
        );
        assert_eq!(
            Ok(Some(Sample::new(3.0, -40.0, 0))),
            parse_record(b"  3\t-40\r", 0)
        );
    }

    #[test]
    fn test_parse_record_at_length_cap() {
        let record = format!("{} -40", "1".repeat(MAX_RECORD_LEN - 4));
        assert_eq!(MAX_RECORD_LEN, record.len());

        let lf = parse_record(record.as_bytes(), 0);
        let crlf = parse_record(format!("{record}\r").as_bytes(), 0);

        assert!(matches!(lf, Ok(Some(_))));
        assert_eq!(lf, crlf);
        assert_eq!(
            Err(MalformedRecord::TooLong(MAX_RECORD_LEN + 1)),
            parse_record(format!("1{record}\r").as_bytes(), 0)
        );
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(Ok(None), parse_record(b"", 0));
        assert_eq!(Ok(None), parse_record(b" \r", 0));
    }

    #[test]
    fn test_parse_malformed_records() {
        for line in [
            "1.25",
            "1.25 -67 3",
            "abc -67",
            "1.25 -67.5",
            "NaN -40",
            "inf -40",
            "1.25,-67",
        ] {
            assert!(
                matches!(parse_record(line.as_bytes(), 0), Err(MalformedRecord::Format(_))),
                "{line}"
            );
        }
    }

    #[test]
    fn test_parse_oversized_record() {
        let line = format!("1.0 -40{}", " ".repeat(MAX_RECORD_LEN));

        assert_eq!(
            Err(MalformedRecord::TooLong(MAX_RECORD_LEN + 7)),
            parse_record(line.as_bytes(), 0)
        );
    }

    #[test]
    fn test_parse_invalid_utf8() {
        assert_eq!(
            Err(MalformedRecord::NotUtf8),
            parse_record(&[0xff, 0xfe, b' ', b'1'], 0)
        );
    }

    #[test]
    fn test_system_clock_is_wall_time() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
