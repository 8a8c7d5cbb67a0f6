use chrono::{DateTime, Local, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use crate::models::RawAmount;

pub const PLACEHOLDER: &str = "N/A";

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

/// Coerces an amount to a number: every character other than digits, `.`
/// and `-` is dropped, then the longest numeric prefix is parsed. Absent or
/// unparseable values become `0.0`.
pub fn coerce_amount(value: Option<&RawAmount>) -> f64 {
    match value {
        Some(RawAmount::Number(number)) if number.is_finite() => *number,
        Some(RawAmount::Number(_)) | None => 0.0,
        Some(RawAmount::Text(text)) => parse_amount_text(text),
    }
}

fn parse_amount_text(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let bytes = cleaned.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    cleaned[..end].parse::<f64>().unwrap_or(0.0)
}

/// Renders a receipt timestamp in local date+time. The service writes naive
/// UTC timestamps; offsets are honoured when present.
pub fn format_timestamp(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return PLACEHOLDER.to_string(),
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.and_utc()));

    match parsed {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => PLACEHOLDER.to_string(),
    }
}

pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => placeholder,
    }
}
