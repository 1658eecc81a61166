//! NetRom network layer

use std::io::{self, Write};

use crate::config::TraceFlags;
use crate::constants::{width, MARGIN};
use crate::dispatch::Decoder;
use crate::{routing, transport};

/// Destination callsign of round-trip-time probes
pub const L3RTT_DESTINATION: &str = "L3RTT";

/// NetRom layer 3 packet kind (`l3Type`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L3Type {
    /// Routed network packet carrying a transport segment
    NetRom,
    /// Routing broadcast or unicast
    RoutingInfo,
    /// Request for routing information
    RoutingPoll,
    /// Any other value
    Unrecognized(String),
}

impl From<&str> for L3Type {
    fn from(value: &str) -> Self {
        match value {
            "NetRom" => L3Type::NetRom,
            "Routing info" => L3Type::RoutingInfo,
            "Routing poll" => L3Type::RoutingPoll,
            other => L3Type::Unrecognized(other.to_string()),
        }
    }
}

pub(crate) fn trace_netrom<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::NETROM) {
        return Ok(());
    }

    let Some(l3_type) = d.field("l3Type", width::LONG) else {
        return d.warn(format_args!(" [missing 'l3Type']"));
    };

    match L3Type::from(l3_type.as_str()) {
        L3Type::NetRom => trace_l3(d),
        L3Type::RoutingInfo => routing::trace_routing_info(d),
        // Polls carry nothing worth showing
        L3Type::RoutingPoll => Ok(()),
        L3Type::Unrecognized(value) => d.warn(format_args!(" [unknown 'l3Type' '{value}']")),
    }
}

fn trace_l3<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if let Some(source) = d.field("l3src", width::L3_CALL) {
        d.out.emit(format_args!("{MARGIN}NTRM: {source}"))?;
    }

    let destination = d.field("l3dst", width::L3_CALL);
    if let Some(destination) = &destination {
        d.out.emit(format_args!(" to {destination}"))?;
    }

    d.optional(" ttl=", "ttl", width::SHORT)?;

    if destination.is_some_and(|dst| dst == L3RTT_DESTINATION) {
        trace_l3rtt(d)
    } else {
        transport::trace_l4(d)
    }
}

/// Round-trip probes look like L4 INFO but belong to layer 3
fn trace_l3rtt<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    d.optional(" ilen=", "paylen", width::SHORT)?;

    if !d.enabled(TraceFlags::L3RTT) {
        return Ok(());
    }

    if let Some(payload) = d.field("payload", width::RTT_PAYLOAD) {
        d.out.emit(format_args!(":{MARGIN}{payload}"))?;
    }
    Ok(())
}
