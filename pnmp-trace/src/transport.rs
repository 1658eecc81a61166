//! NetRom transport layer (L4)
//!
//! Only headers are shown for connection traffic; information payloads are
//! shown for INFO segments. The choke/NAK/more flags are appended only after
//! the INFO, INFO ACK and unrecognised branches.

use std::io::{self, Write};

use crate::config::TraceFlags;
use crate::constants::{width, CONNECT_USER_MARGIN, MARGIN};
use crate::dispatch::Decoder;

/// Transport segment kind (`l4type`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L4Type {
    /// `CONN REQ`
    ConnectRequest,
    /// `CONN_REQX`, extended connect request
    ConnectRequestExtended,
    /// `CONN ACK`
    ConnectAck,
    /// `CONN NAK`
    ConnectNak,
    /// `DREQ`
    DisconnectRequest,
    /// `DACK`
    DisconnectAck,
    /// `RSET`
    Reset,
    /// `INFO`
    Info,
    /// `INFO ACK`
    InfoAck,
    /// `PROT EXT`
    ProtocolExtension,
    /// `NRR Request`
    RecordRouteRequest,
    /// `NRR Reply`
    RecordRouteReply,
    /// `IP` over NetRom
    Ip,
    /// `NCMP`
    Ncmp,
    /// `NDP`
    Ndp,
    /// `GNET`
    Gnet,
    /// The reporter could not classify the segment
    Unknown,
    /// Any other value
    Unrecognized(String),
}

impl L4Type {
    /// The label as it appears in reports and traces
    pub fn label(&self) -> &str {
        match self {
            L4Type::ConnectRequest => "CONN REQ",
            L4Type::ConnectRequestExtended => "CONN_REQX",
            L4Type::ConnectAck => "CONN ACK",
            L4Type::ConnectNak => "CONN NAK",
            L4Type::DisconnectRequest => "DREQ",
            L4Type::DisconnectAck => "DACK",
            L4Type::Reset => "RSET",
            L4Type::Info => "INFO",
            L4Type::InfoAck => "INFO ACK",
            L4Type::ProtocolExtension => "PROT EXT",
            L4Type::RecordRouteRequest => "NRR Request",
            L4Type::RecordRouteReply => "NRR Reply",
            L4Type::Ip => "IP",
            L4Type::Ncmp => "NCMP",
            L4Type::Ndp => "NDP",
            L4Type::Gnet => "GNET",
            L4Type::Unknown => "unknown",
            L4Type::Unrecognized(value) => value,
        }
    }
}

impl From<&str> for L4Type {
    fn from(value: &str) -> Self {
        match value {
            "CONN REQ" => L4Type::ConnectRequest,
            "CONN_REQX" => L4Type::ConnectRequestExtended,
            "CONN ACK" => L4Type::ConnectAck,
            "CONN NAK" => L4Type::ConnectNak,
            "DREQ" => L4Type::DisconnectRequest,
            "DACK" => L4Type::DisconnectAck,
            "RSET" => L4Type::Reset,
            "INFO" => L4Type::Info,
            "INFO ACK" => L4Type::InfoAck,
            "PROT EXT" => L4Type::ProtocolExtension,
            "NRR Request" => L4Type::RecordRouteRequest,
            "NRR Reply" => L4Type::RecordRouteReply,
            "IP" => L4Type::Ip,
            "NCMP" => L4Type::Ncmp,
            "NDP" => L4Type::Ndp,
            "GNET" => L4Type::Gnet,
            "unknown" => L4Type::Unknown,
            other => L4Type::Unrecognized(other.to_string()),
        }
    }
}

pub(crate) fn trace_l4<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::L4) {
        return Ok(());
    }

    let Some(raw) = d.field("l4type", width::SUBTYPE) else {
        return d.warn(format_args!(" [missing 'l4Type']"));
    };
    let kind = L4Type::from(raw.as_str());
    let label = kind.label();

    let show_flags = match &kind {
        L4Type::Unknown => {
            d.warn(format_args!(" [unknown 'l4Type']"))?;
            false
        }
        L4Type::ProtocolExtension => {
            d.out.emit(format_args!(" <{label}>"))?;
            d.optional(" pf=", "l4Family", width::L4_DETAIL)?;
            d.optional(" prot=", "l4Proto", width::L4_DETAIL)?;
            false
        }
        L4Type::Ip | L4Type::Ncmp | L4Type::Ndp | L4Type::Gnet => {
            d.out.emit(format_args!(" <{label}>"))?;
            false
        }
        L4Type::RecordRouteRequest | L4Type::RecordRouteReply => {
            d.out.emit(format_args!(" <{label}>"))?;
            d.optional(" id=", "nrrId", width::L4_DETAIL)?;
            if let Some(route) = d.field("nrrRoute", width::PAYLOAD) {
                d.out.emit(format_args!("{MARGIN}Route: {route}"))?;
            }
            false
        }
        L4Type::ConnectRequest | L4Type::ConnectRequestExtended => {
            circuit(d)?;
            connect_request(d, label)?;
            false
        }
        L4Type::ConnectAck => {
            circuit(d)?;
            d.out.emit(format_args!(" <{label}>"))?;
            d.optional(" w=", "window", width::SHORT)?;
            d.optional(" myCct=", "fromCct", width::SHORT)?;
            false
        }
        L4Type::ConnectNak | L4Type::DisconnectRequest | L4Type::DisconnectAck => {
            circuit(d)?;
            d.out.emit(format_args!(" <{label}>"))?;
            false
        }
        L4Type::Reset => {
            circuit(d)?;
            d.out.emit(format_args!(" <{label}>"))?;
            d.optional(" myCct=", "fromCct", width::SHORT)?;
            false
        }
        L4Type::Info => {
            circuit(d)?;
            d.out.emit(format_args!(" <{label}"))?;
            d.optional(" S", "txSeq", width::SHORT)?;
            d.optional(" R", "rxSeq", width::SHORT)?;
            d.out.put(">")?;
            d.optional(" ilen=", "paylen", width::SHORT)?;
            if let Some(payload) = d.field("payload", width::PAYLOAD) {
                d.out.emit(format_args!(":{MARGIN}{payload}"))?;
            }
            true
        }
        L4Type::InfoAck => {
            circuit(d)?;
            d.out.emit(format_args!(" <{label}"))?;
            d.optional(" R", "rxSeq", width::SHORT)?;
            d.out.put(">")?;
            true
        }
        L4Type::Unrecognized(value) => {
            circuit(d)?;
            d.warn(format_args!(" [unknown 'l4Type' '{value}']"))?;
            true
        }
    };

    if show_flags {
        // Presence alone sets the flag
        for (field, tag) in [
            ("chokeFlag", " <CHOKE>"),
            ("nakFlag", " <NAK>"),
            ("moreFlag", " <MORE>"),
        ] {
            if d.field(field, width::SHORT).is_some() {
                d.out.put(tag)?;
            }
        }
    }
    Ok(())
}

fn circuit<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    d.optional(" cct=", "toCct", width::SHORT).map(drop)
}

fn connect_request<W: Write>(d: &mut Decoder<'_, W>, label: &str) -> io::Result<()> {
    d.out.emit(format_args!(" <{label}>"))?;
    d.optional(" w=", "window", width::SHORT)?;

    let Some(user) = d.field("srcUser", width::NODE_CALL) else {
        return Ok(());
    };
    d.out.emit(format_args!("{CONNECT_USER_MARGIN}{user}"))?;

    d.optional(" at ", "srcNode", width::NODE_CALL)?;
    d.optional(" svc=", "service", width::SHORT)?;
    d.optional(" t/o=", "l4t1", width::SHORT)?;
    d.optional(" bpqSpy=", "bpqSpy", width::SHORT)?;
    Ok(())
}
