//! Link-layer frame context and report discriminators

use pnmp_format::{FieldValue, RawObject};

use crate::constants::{color, width};

/// The declared purpose of a report (`@type`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// An observed link-layer frame
    L2Trace,
    /// Any other report kind; not decoded
    Unrecognized(String),
}

impl From<&str> for ReportKind {
    fn from(value: &str) -> Self {
        match value {
            "L2Trace" => ReportKind::L2Trace,
            other => ReportKind::Unrecognized(other.to_string()),
        }
    }
}

/// Protocol carried in the information field (`ptcl`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// NetRom network and transport layers
    NetRom,
    /// Plain text payload
    Data,
    /// Internet Protocol
    Ip,
    /// Address Resolution Protocol
    Arp,
    /// Named but not decoded
    Unrecognized(String),
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        match value {
            "NET/ROM" => Protocol::NetRom,
            "DATA" => Protocol::Data,
            "IP" => Protocol::Ip,
            "ARP" => Protocol::Arp,
            other => Protocol::Unrecognized(other.to_string()),
        }
    }
}

/// Direction of the frame relative to the reporting node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the reporter
    Sent,
    /// Received by the reporter
    Received,
    /// Absent or unrecognised
    Unknown,
}

impl Direction {
    /// Classify by the first letter of the `dirn` value
    pub fn from_field(value: Option<&str>) -> Self {
        match value.and_then(|v| v.chars().next()) {
            Some('s') => Direction::Sent,
            Some('r') => Direction::Received,
            _ => Direction::Unknown,
        }
    }
}

/// Whether the port is a radio port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfState {
    /// `isRF` starts with `t`
    Rf,
    /// `isRF` starts with `f`
    NonRf,
    /// Absent or unrecognised
    Unknown,
}

impl RfState {
    /// Classify by the first letter of the `isRF` value
    pub fn from_field(value: Option<&str>) -> Self {
        match value.and_then(|v| v.chars().next()) {
            Some('t') => RfState::Rf,
            Some('f') => RfState::NonRf,
            _ => RfState::Unknown,
        }
    }
}

const PALETTE: [[&str; 3]; 3] = [
    [color::RF_SENT, color::RF_RECEIVED, color::RF_UNKNOWN],
    [
        color::WIRED_SENT,
        color::WIRED_RECEIVED,
        color::WIRED_UNKNOWN,
    ],
    [color::DEFAULT, color::DEFAULT, color::DEFAULT],
];

/// Color escape for a frame
pub fn frame_color(rf: RfState, direction: Direction) -> &'static str {
    let row = match rf {
        RfState::Rf => 0,
        RfState::NonRf => 1,
        RfState::Unknown => 2,
    };
    let col = match direction {
        Direction::Sent => 0,
        Direction::Received => 1,
        Direction::Unknown => 2,
    };
    PALETTE[row][col]
}

/// Fields extracted once per L2 frame and shared by filtering and rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    /// Reporting node id
    pub reporter: FieldValue,
    /// Port on the reporting node
    pub port: FieldValue,
    /// L2 source callsign
    pub source: FieldValue,
    /// L2 destination callsign
    pub destination: FieldValue,
    /// L2 frame type, e.g. `I`, `UI`, `RR`
    pub frame_type: FieldValue,
    /// `dirn`, if present
    pub direction: Option<FieldValue>,
    /// `isRF`, if present
    pub rf: Option<FieldValue>,
    /// `ptcl`, if present
    pub protocol: Option<FieldValue>,
}

impl FrameContext {
    /// Names of the mandatory fields, in extraction order
    pub const MANDATORY: [&'static str; 5] = ["reportFrom", "port", "srce", "dest", "l2Type"];

    /// Extract the context, or name the first mandatory field that is missing
    pub fn extract(object: &RawObject) -> Result<Self, &'static str> {
        let mandatory = |name: &'static str, max_len: usize| object.get(name, max_len).map_err(|_| name);

        let reporter = mandatory("reportFrom", width::CALL)?;
        let port = mandatory("port", width::CALL)?;
        let source = mandatory("srce", width::CALL)?;
        let destination = mandatory("dest", width::CALL)?;
        let frame_type = mandatory("l2Type", width::L2_TYPE)?;

        Ok(Self {
            reporter,
            port,
            source,
            destination,
            frame_type,
            direction: object.get("dirn", width::DIRECTION).ok(),
            rf: object.get("isRF", width::DIRECTION).ok(),
            protocol: object.get("ptcl", width::L2_TYPE).ok(),
        })
    }

    /// Direction classification
    pub fn direction(&self) -> Direction {
        Direction::from_field(self.direction.as_deref())
    }

    /// RF classification
    pub fn rf_state(&self) -> RfState {
        RfState::from_field(self.rf.as_deref())
    }

    /// Protocol discriminator, if the frame names one
    pub fn protocol_kind(&self) -> Option<Protocol> {
        self.protocol
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Protocol::from)
    }
}
