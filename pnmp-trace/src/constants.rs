//! Layout constants and per-field value widths

/// Left margin for L3/L4 continuation lines
pub const MARGIN: &str = "\n    ";

/// Continuation indent used when an INP3 entry wraps
pub const WRAP_MARGIN: &str = "\n        ";

/// Indent of the user line of a NetRom connect request
pub const CONNECT_USER_MARGIN: &str = "\n          ";

/// Default display width in columns
pub const DEFAULT_DISPLAY_WIDTH: usize = 80;

/// Maximum characters kept from a filter value
pub const FILTER_WIDTH: usize = 15;

/// Unix timestamps at or below this, compared as unsigned 32-bit, are treated as unset
pub const MIN_UNIX_TIMESTAMP: u32 = 18_000;

/// Value widths used when extracting fields, in characters
pub mod width {
    /// `@type`
    pub const REPORT_KIND: usize = 80;
    /// `reportFrom`, `port`, `srce`, `dest`
    pub const CALL: usize = 15;
    /// `l2Type`, `ptcl`
    pub const L2_TYPE: usize = 7;
    /// `dirn`, `isRF`
    pub const DIRECTION: usize = 4;
    /// `cr`, `pf`
    pub const CONTROL: usize = 2;
    /// `rseq`, `tseq`
    pub const SEQUENCE: usize = 3;
    /// `ilen`, `pid`
    pub const INFO_LEN: usize = 10;
    /// `info`
    pub const INFO: usize = 1023;
    /// `icrc` and most short numeric L4 fields
    pub const SHORT: usize = 8;
    /// `time`
    pub const TIME: usize = 20;
    /// NetRom `l3src`, `l3dst`
    pub const L3_CALL: usize = 10;
    /// `l3Type`, ARP fields
    pub const LONG: usize = 79;
    /// Routing `type`, `l4type`
    pub const SUBTYPE: usize = 15;
    /// Node alias
    pub const ALIAS: usize = 6;
    /// Node callsign inside routing entries, `srcUser`, `srcNode`
    pub const NODE_CALL: usize = 9;
    /// NODES quality
    pub const QUALITY: usize = 3;
    /// INP3 hop count
    pub const HOPS: usize = 2;
    /// INP3 trip time
    pub const TRIP_TIME: usize = 5;
    /// INP3 coordinates and software name
    pub const DESCRIPTION: usize = 20;
    /// INP3 software version
    pub const VERSION: usize = 10;
    /// INP3 capability booleans
    pub const BOOLEAN: usize = 5;
    /// INP3 timestamp
    pub const TIMESTAMP: usize = 40;
    /// L4 protocol family/number, record-route id
    pub const L4_DETAIL: usize = 80;
    /// L4 payload, record-route list
    pub const PAYLOAD: usize = 2047;
    /// L3RTT payload
    pub const RTT_PAYLOAD: usize = 511;
    /// IP addresses
    pub const IP_ADDRESS: usize = 15;
    /// `ipLen`, `ipID`, `ipPtcl`
    pub const IP_FIELD: usize = 6;
    /// `ipTTL`
    pub const IP_TTL: usize = 3;
}

/// ANSI color escapes
pub mod color {
    /// RF, sent
    pub const RF_SENT: &str = "\x1b[91m";
    /// RF, received
    pub const RF_RECEIVED: &str = "\x1b[92m";
    /// RF, direction unknown
    pub const RF_UNKNOWN: &str = "\x1b[93m";
    /// Non-RF, sent
    pub const WIRED_SENT: &str = "\x1b[38;2;255;150;150m";
    /// Non-RF, received
    pub const WIRED_RECEIVED: &str = "\x1b[38;2;50;255;150m";
    /// Non-RF, direction unknown
    pub const WIRED_UNKNOWN: &str = "\x1b[94m";
    /// RF status unknown
    pub const DEFAULT: &str = "\x1b[0m";
}
