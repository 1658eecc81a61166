//! Incremental framing of top-level objects from a byte stream
//!
//! The framer captures the text *between* the outermost braces of each
//! top-level `{...}`. Bytes outside any object are ignored. A backslash
//! escapes the following byte whether or not it sits inside a quoted string.

use std::io::{self, BufRead, ErrorKind};

use bytes::BytesMut;

use crate::limits::Limits;
use crate::object::RawObject;

/// Scanner state between bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Depth 0, waiting for an opening brace
    Idle,
    /// Inside a top-level object
    InObject {
        depth: usize,
        in_string: bool,
        escape_next: bool,
    },
}

/// Outcome of closing a top-level object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framed {
    /// A complete object within limits
    Object(RawObject),
    /// An object whose text exceeded `Limits::max_object_bytes`; its text is discarded
    Oversize {
        /// Total captured length in bytes
        len: usize,
    },
}

/// Byte-at-a-time brace-balancing state machine
#[derive(Debug)]
pub struct ObjectFramer {
    state: State,
    buffer: BytesMut,
    captured: usize,
    max_object_bytes: usize,
}

impl ObjectFramer {
    /// Create a framer with default limits
    pub fn new() -> Self {
        Self::with_limits(&Limits::default())
    }

    /// Create a framer with explicit limits
    pub fn with_limits(limits: &Limits) -> Self {
        Self {
            state: State::Idle,
            buffer: BytesMut::with_capacity(4096),
            captured: 0,
            max_object_bytes: limits.max_object_bytes,
        }
    }

    /// True while a top-level object is open
    pub fn in_object(&self) -> bool {
        matches!(self.state, State::InObject { .. })
    }

    /// Feed one byte, returning an object when it closes.
    pub fn push(&mut self, byte: u8) -> Option<Framed> {
        let State::InObject {
            mut depth,
            mut in_string,
            mut escape_next,
        } = self.state
        else {
            if byte == b'{' {
                self.buffer.clear();
                self.captured = 0;
                self.state = State::InObject {
                    depth: 1,
                    in_string: false,
                    escape_next: false,
                };
            }
            return None;
        };

        if escape_next {
            escape_next = false;
        } else if byte == b'\\' {
            escape_next = true;
        } else if byte == b'"' {
            in_string = !in_string;
        } else if !in_string && byte == b'{' {
            depth += 1;
        } else if !in_string && byte == b'}' {
            depth -= 1;
            if depth == 0 {
                self.state = State::Idle;
                return Some(self.take());
            }
        }

        self.append(byte);
        self.state = State::InObject {
            depth,
            in_string,
            escape_next,
        };
        None
    }

    /// Signal end of input, discarding any unterminated object.
    ///
    /// Returns the number of bytes discarded (0 if the framer was idle).
    pub fn finish(&mut self) -> usize {
        let discarded = if self.in_object() { self.captured } else { 0 };
        self.state = State::Idle;
        self.buffer.clear();
        self.captured = 0;
        discarded
    }

    fn append(&mut self, byte: u8) {
        if self.captured < self.max_object_bytes {
            self.buffer.extend_from_slice(&[byte]);
        }
        self.captured += 1;
    }

    fn take(&mut self) -> Framed {
        let len = self.captured;
        let bytes = self.buffer.split();
        self.captured = 0;
        if len > self.max_object_bytes {
            Framed::Oversize { len }
        } else {
            Framed::Object(RawObject::from_bytes(&bytes))
        }
    }
}

impl Default for ObjectFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy, single-pass sequence of framed objects read from `R`
#[derive(Debug)]
pub struct Objects<R: BufRead> {
    reader: R,
    framer: ObjectFramer,
    done: bool,
}

impl<R: BufRead> Objects<R> {
    /// Frame objects from `reader` with default limits
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, &Limits::default())
    }

    /// Frame objects from `reader` with explicit limits
    pub fn with_limits(reader: R, limits: &Limits) -> Self {
        Self {
            reader,
            framer: ObjectFramer::with_limits(limits),
            done: false,
        }
    }

    fn next_framed(&mut self) -> io::Result<Option<Framed>> {
        loop {
            let (consumed, framed) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buf.is_empty() {
                    return Ok(None);
                }

                let mut consumed = buf.len();
                let mut framed = None;
                for (idx, &byte) in buf.iter().enumerate() {
                    if let Some(item) = self.framer.push(byte) {
                        consumed = idx + 1;
                        framed = Some(item);
                        break;
                    }
                }
                (consumed, framed)
            };

            self.reader.consume(consumed);
            if framed.is_some() {
                return Ok(framed);
            }
        }
    }
}

impl<R: BufRead> Iterator for Objects<R> {
    type Item = io::Result<Framed>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_framed() {
            Ok(Some(framed)) => {
                let len = match &framed {
                    Framed::Object(object) => object.len(),
                    Framed::Oversize { len } => *len,
                };
                tracing::trace!(len, "framed object");
                Some(Ok(framed))
            }
            Ok(None) => {
                self.done = true;
                let discarded = self.framer.finish();
                if discarded > 0 {
                    tracing::debug!(discarded, "input ended inside an object");
                }
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
