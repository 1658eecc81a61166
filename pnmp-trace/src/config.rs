//! Trace configuration: filters, display flags and width

use pnmp_format::field::truncate_chars;

use crate::constants::{DEFAULT_DISPLAY_WIDTH, FILTER_WIDTH};
use crate::error::{Result, TraceError};

bitflags::bitflags! {
    /// Display and decode switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TraceFlags: u32 {
        /// Unnumbered information frames
        const UI = 1 << 0;
        /// NetRom layer 3 and above
        const NETROM = 1 << 1;
        /// Info field of L3RTT probes
        const L3RTT = 1 << 2;
        /// Contents of NODES broadcasts
        const NODES = 1 << 3;
        /// Contents of INP3 routing unicasts
        const INP3 = 1 << 4;
        /// NetRom layer 4 headers
        const L4 = 1 << 5;
        /// IP headers
        const IP = 1 << 6;
        /// ARP packets
        const ARP = 1 << 7;
        /// ANSI color per frame
        const COLOR = 1 << 8;
        /// Timestamp each trace
        const STAMP = 1 << 9;
        /// Blank line between traces
        const LINE_BREAK = 1 << 10;
        /// Metadata header on its own line
        const HEADER_LINE = 1 << 11;
        /// Echo the raw object before the trace
        const RAW_JSON = 1 << 12;
        /// Write to the capture sink only
        const QUIET = 1 << 13;
        /// Send color escapes to the capture sink too
        const COLOR_TO_CAPTURE = 1 << 14;
        /// Diagnostics for missing or unknown fields
        const WARNINGS = 1 << 15;
    }
}

impl Default for TraceFlags {
    /// Everything up to and including the line break on; layout and diagnostic extras off
    fn default() -> Self {
        Self::UI
            .union(Self::NETROM)
            .union(Self::L3RTT)
            .union(Self::NODES)
            .union(Self::INP3)
            .union(Self::L4)
            .union(Self::IP)
            .union(Self::ARP)
            .union(Self::COLOR)
            .union(Self::STAMP)
            .union(Self::LINE_BREAK)
    }
}

/// Optional match criteria. Unset criteria never reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Reporting node id
    pub reporter: Option<String>,
    /// L2 source callsign
    pub source: Option<String>,
    /// L2 destination callsign
    pub destination: Option<String>,
    /// Either L2 source or destination callsign
    pub either: Option<String>,
    /// Protocol id, e.g. `NET/ROM`
    pub protocol: Option<String>,
    /// L2 frame type, e.g. `UI`
    pub frame_type: Option<String>,
    /// Port number; 0 means unset
    pub port: u32,
}

impl Filters {
    /// True if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.reporter.is_none()
            && self.source.is_none()
            && self.destination.is_none()
            && self.either.is_none()
            && self.protocol.is_none()
            && self.frame_type.is_none()
            && self.port == 0
    }
}

/// Normalise a user-supplied filter value.
///
/// Empty values mean "unset"; others keep at most 15 characters.
pub fn filter_value(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref();
    if value.is_empty() {
        None
    } else {
        Some(truncate_chars(value, FILTER_WIDTH).to_string())
    }
}

/// Immutable configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// Match criteria
    pub filters: Filters,
    /// Display and decode switches
    pub flags: TraceFlags,
    /// Column at which INP3 decorations wrap
    pub display_width: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            flags: TraceFlags::default(),
            display_width: DEFAULT_DISPLAY_WIDTH,
        }
    }
}

impl TraceConfig {
    /// Shorthand for `self.flags.contains(flag)`
    pub fn enabled(&self, flag: TraceFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Reject settings no trace could be rendered with
    pub fn validate(&self) -> Result<()> {
        if self.display_width == 0 {
            return Err(TraceError::Config(
                "display width must be at least 1 column".to_string(),
            ));
        }
        Ok(())
    }
}
