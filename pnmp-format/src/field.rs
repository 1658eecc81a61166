//! Field extraction from serialised object text
//!
//! Lookups re-scan the text on every call. A key is located by a
//! case-insensitive search for its quoted name anywhere in the text, so a
//! string *value* that happens to equal a quoted key name also matches.
//! Callers that care narrow the search window (see [`FieldValue::end`]).

use std::fmt;
use std::ops::Deref;

use crate::error::{Result, ScanError};

/// A scalar copied out of an object, bounded to the caller's destination size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    text: String,
    end: usize,
}

impl FieldValue {
    /// The (possibly truncated) value text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset in the scanned text just past the value.
    ///
    /// For quoted values this is past the closing quote.
    pub fn end(&self) -> usize {
        self.end
    }

    /// First character of the value, if any
    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Leading integer of the value, 0 when there is none
    pub fn as_int(&self) -> i64 {
        parse_leading_int(&self.text)
    }

    /// Consume the value and return the text
    pub fn into_string(self) -> String {
        self.text
    }
}

impl Deref for FieldValue {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for FieldValue {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for FieldValue {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// Locate the value of key `name`, returning its byte offset in `text`.
///
/// Matches `"name"` case-insensitively anywhere in the text, then advances
/// past the closing quote of the match to the first colon found after it
/// (anything in between is tolerated) and past any whitespace.
pub fn find_key(text: &str, name: &str) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut needle = Vec::with_capacity(name.len() + 2);
    needle.push(b'"');
    needle.extend_from_slice(name.as_bytes());
    needle.push(b'"');

    let start = find_ignore_ascii_case(bytes, &needle)
        .ok_or_else(|| ScanError::KeyNotFound(name.to_string()))?;

    // Skip the opening quote, then find the end of the name.
    let mut pos = start + 1;
    while pos < bytes.len() && bytes[pos] != b'"' {
        pos += 1;
    }

    while pos < bytes.len() && bytes[pos] != b':' {
        pos += 1;
    }
    if pos >= bytes.len() {
        return Err(ScanError::MissingColon(name.to_string()));
    }
    pos += 1;

    while pos < bytes.len() && is_c_space(bytes[pos]) {
        pos += 1;
    }
    Ok(pos)
}

/// Extract the scalar value of key `name`, keeping at most `max_len` characters.
///
/// A quoted value is copied up to the next quote with no escape processing.
/// Anything else is copied as a run of ASCII letters, digits, `-` and `.`.
/// Over-long values are truncated silently.
pub fn get_value(text: &str, name: &str, max_len: usize) -> Result<FieldValue> {
    let start = find_key(text, name)?;
    let bytes = text.as_bytes();

    let (raw, end) = if bytes.get(start) == Some(&b'"') {
        let body = start + 1;
        match bytes[body..].iter().position(|&b| b == b'"') {
            Some(len) => (&text[body..body + len], body + len + 1),
            None => (&text[body..], bytes.len()),
        }
    } else {
        let len = bytes[start..]
            .iter()
            .take_while(|&&b| b == b'-' || b == b'.' || b.is_ascii_alphanumeric())
            .count();
        (&text[start..start + len], start + len)
    };

    Ok(FieldValue {
        text: truncate_chars(raw, max_len).to_string(),
        end,
    })
}

/// Locate the array value of key `name`, returning the offset of its `[`.
pub fn find_array(text: &str, name: &str) -> Result<usize> {
    let pos = find_key(text, name)?;
    if text.as_bytes().get(pos) == Some(&b'[') {
        Ok(pos)
    } else {
        Err(ScanError::NotAnArray(name.to_string()))
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parse a leading decimal integer the way C `atoi` does.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. Text without digits yields 0 and overflow saturates.
pub fn parse_leading_int(text: &str) -> i64 {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() && is_c_space(bytes[pos]) {
        pos += 1;
    }

    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while let Some(digit) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
        let d = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
        pos += 1;
    }
    value
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

// Same set as C isspace() in the "C" locale
fn is_c_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}
