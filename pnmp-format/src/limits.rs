//! Buffer limits for framing and array iteration

/// Default upper bound on the captured text of one top-level object.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 64 * 1024;

/// Default upper bound on one copied array element, braces included.
pub const DEFAULT_MAX_ELEMENT_CHARS: usize = 1023;

/// Limits applied while scanning untrusted input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum captured bytes per top-level object (default: 64 KiB).
    /// Larger objects are still brace-tracked but discarded when they close.
    pub max_object_bytes: usize,
    /// Maximum characters copied per array element (default: 1023).
    /// Longer elements are truncated, not rejected.
    pub max_element_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
            max_element_chars: DEFAULT_MAX_ELEMENT_CHARS,
        }
    }
}
