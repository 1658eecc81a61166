//! Iteration over flat arrays of simple objects
//!
//! Elements are delimited by the first `}` after their opening `{`; braces
//! nested inside an element are not tracked. Arrays of nested objects give
//! truncated (but bounded) elements.

use crate::error::{Result, ScanError};
use crate::field::truncate_chars;

/// One array element copied out of the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayElement {
    /// Element text from `{` through `}` inclusive, possibly truncated
    pub text: String,
    /// Byte offset of the element's opening brace in the scanned text
    pub offset: usize,
}

/// Step from the element at `cursor` to the following one.
///
/// Scans forward to the next `}` (the end of the current element), then to
/// the next `{`. Either scan fails on reaching `]` or the end of the text.
/// The returned element is copied through its first `}` and truncated to
/// `max_chars` characters.
pub fn next_element(text: &str, cursor: usize, max_chars: usize) -> Result<ArrayElement> {
    let bytes = text.as_bytes();

    let close = scan_to(bytes, cursor, b'}').ok_or(ScanError::NoElement)?;
    let open = scan_to(bytes, close, b'{').ok_or(ScanError::NoElement)?;

    Ok(copy_element(text, open, max_chars))
}

/// Iterator over the elements of an array, starting at its `[`
#[derive(Debug, Clone)]
pub struct ArrayElements<'a> {
    text: &'a str,
    cursor: Option<usize>,
    array_start: usize,
    max_chars: usize,
    done: bool,
}

impl<'a> ArrayElements<'a> {
    /// Iterate the array whose `[` sits at `array_start` in `text`.
    pub fn new(text: &'a str, array_start: usize, max_chars: usize) -> Self {
        Self {
            text,
            cursor: None,
            array_start,
            max_chars,
            done: false,
        }
    }

    /// Iterate the elements following the one at `cursor`.
    ///
    /// Every element is reached through [`next_element`], so with `cursor`
    /// on the array's `[` the first element is passed over.
    pub fn after(text: &'a str, cursor: usize, max_chars: usize) -> Self {
        Self {
            cursor: Some(cursor),
            ..Self::new(text, cursor, max_chars)
        }
    }

    fn first(&self) -> Result<ArrayElement> {
        let open = scan_to(self.text.as_bytes(), self.array_start + 1, b'{')
            .ok_or(ScanError::NoElement)?;
        Ok(copy_element(self.text, open, self.max_chars))
    }
}

impl Iterator for ArrayElements<'_> {
    type Item = ArrayElement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = match self.cursor {
            None => self.first(),
            Some(cursor) => next_element(self.text, cursor, self.max_chars),
        };

        match step {
            Ok(element) => {
                self.cursor = Some(element.offset);
                Some(element)
            }
            Err(_) => {
                self.done = true;
                None
            }
        }
    }
}

/// Position of the first `target` at or after `from`, giving up at `]`.
fn scan_to(bytes: &[u8], from: usize, target: u8) -> Option<usize> {
    let found = bytes
        .get(from..)?
        .iter()
        .position(|&b| b == target || b == b']')?;
    let pos = from + found;
    (bytes[pos] == target).then_some(pos)
}

fn copy_element(text: &str, open: usize, max_chars: usize) -> ArrayElement {
    let rest = &text[open..];
    let through_close = match rest.find('}') {
        Some(close) => &rest[..=close],
        None => rest,
    };
    ArrayElement {
        text: truncate_chars(through_close, max_chars).to_string(),
        offset: open,
    }
}
