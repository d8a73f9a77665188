// Utility helpers for parsing feed fields and formatting numbers.
//
// Feed fields arrive as raw text; everything here trims first and returns
// `None` instead of failing so callers decide what a missing value means.
use num_format::{Locale, ToFormattedString};

/// Trimmed field at `idx`, or an empty string when the row is too short.
pub fn field<S: AsRef<str>>(fields: &[S], idx: usize) -> &str {
    fields.get(idx).map(|s| s.as_ref().trim()).unwrap_or("")
}

pub fn parse_i64_safe(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok()
}

pub fn parse_u32_safe(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

pub fn parse_i32_safe(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Feed country names use underscores for spaces (`United_Kingdom`).
pub fn display_name(raw: &str) -> String {
    raw.trim().replace('_', " ")
}

/// First `max_chars` characters of a name, for narrow table columns.
pub fn short_name(name: &str, max_chars: usize) -> String {
    name.chars().take(max_chars).collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with thousands separators on the integer part.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
