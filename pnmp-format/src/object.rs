//! Immutable text of one framed object

use std::fmt;

use crate::array::ArrayElements;
use crate::error::Result;
use crate::field::{self, FieldValue};
use crate::limits::DEFAULT_MAX_ELEMENT_CHARS;

/// Text between the outermost braces of one top-level object.
///
/// Never mutated after framing; every lookup re-scans the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    text: String,
}

impl RawObject {
    /// Wrap already-framed text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wrap framed bytes, replacing invalid UTF-8 sequences
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// The object text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True for `{}`
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consume and return the text
    pub fn into_string(self) -> String {
        self.text
    }

    /// See [`field::get_value`]
    pub fn get(&self, name: &str, max_len: usize) -> Result<FieldValue> {
        field::get_value(&self.text, name, max_len)
    }

    /// See [`field::find_array`]
    pub fn find_array(&self, name: &str) -> Result<usize> {
        field::find_array(&self.text, name)
    }

    /// Elements of the array keyed `name`, with the default element bound
    pub fn array(&self, name: &str) -> Result<ArrayElements<'_>> {
        let start = self.find_array(name)?;
        Ok(ArrayElements::new(
            &self.text,
            start,
            DEFAULT_MAX_ELEMENT_CHARS,
        ))
    }
}

impl fmt::Display for RawObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for RawObject {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
