//! PNMP Format - Scanner primitives for PNMP trace reports
//!
//! This crate frames and reads the loosely-structured JSON objects published
//! by the Packet Network Monitoring Project, without building a parse tree.
//! It includes:
//!
//! - Stream framing of brace-balanced top-level objects
//! - Case-insensitive field extraction with bounded values
//! - Iteration over flat arrays of simple objects
//! - Error types
//! - Buffer limits
//!
//! It is deliberately not a JSON parser: numbers are not validated, string
//! escapes are not decoded and only one level of array nesting is understood.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod array;
pub mod error;
pub mod field;
pub mod framer;
pub mod limits;
pub mod object;

// Re-export commonly used types
pub use array::{next_element, ArrayElement, ArrayElements};
pub use error::{Result, ScanError};
pub use field::{find_array, find_key, get_value, parse_leading_int, FieldValue};
pub use framer::{Framed, ObjectFramer, Objects};
pub use limits::Limits;
pub use object::RawObject;
