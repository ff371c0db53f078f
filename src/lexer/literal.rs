//! Decoding of literal bodies (hex, base64, timestamps, numbers)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Resolve the escapes in a quoted string body
///
/// Only `\'` and `\\` are valid. The error carries the byte offset of the
/// backslash within `body` and the character after it. A lone trailing
/// backslash is left for the caller, which only sees one in unterminated text.
pub(super) fn unescape(body: &str) -> Result<String, (usize, char)> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.char_indices();

    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some((_, escaped @ ('\'' | '\\'))) => value.push(escaped),
            Some((_, other)) => return Err((at, other)),
            None => {}
        }
    }

    Ok(value)
}

/// Decode the body of an `h'...'` literal: an even number of hex digits
pub(super) fn decode_hex(body: &str) -> Result<Vec<u8>, String> {
    if body.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", body.len()));
    }

    body.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(b: u8) -> Result<u8, String> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(format!("'{}' is not a hex digit", b as char)),
    }
}

/// Decode the body of a `b'...'` literal: standard, padded base64
pub(super) fn decode_binary(body: &str) -> Result<Vec<u8>, String> {
    STANDARD.decode(body).map_err(|e| e.to_string())
}

/// Parse the body of a `t'...'` literal
///
/// Supports:
/// - RFC 3339 with any offset: "2016-02-14T00:00:00Z", "2016-02-14T01:00:00+01:00"
/// - ISO 8601 without offset, read as UTC: "2016-02-14T00:00:00", "2016-02-14T00:00:00.250"
pub(super) fn parse_timestamp(body: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(body) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("'{body}' is not an RFC 3339 timestamp"))
}

pub(super) fn parse_integer(text: &str) -> Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| format!("{text} does not fit in a 64-bit signed integer"))
}

pub(super) fn parse_float(text: &str) -> Result<f64, String> {
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        Ok(_) => Err(format!("{text} is out of range")),
        Err(e) => Err(e.to_string()),
    }
}
