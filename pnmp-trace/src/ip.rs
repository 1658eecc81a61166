//! IP and ARP headers carried directly over the link
//!
//! Older reporters omit the decoded fields; such frames show only the link
//! header.

use std::io::{self, Write};

use crate::config::TraceFlags;
use crate::constants::{width, MARGIN};
use crate::dispatch::Decoder;

/// `IP: 44.136.16.50 > 44.136.16.52 iplen=28 ttl=127 id=ABA0 ptcl=1 ICMP`
pub(crate) fn trace_ip<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::IP) {
        return Ok(());
    }

    let (Some(source), Some(destination)) = (
        d.field("ipFrom", width::IP_ADDRESS),
        d.field("ipTo", width::IP_ADDRESS),
    ) else {
        return Ok(());
    };

    d.out.emit(format_args!("{MARGIN}IP: {source} > {destination}"))?;
    d.optional(" iplen=", "ipLen", width::IP_FIELD)?;
    d.optional(" ttl=", "ipTTL", width::IP_TTL)?;
    d.optional(" id=", "ipID", width::IP_FIELD)?;
    d.optional(" ptcl=", "ipPtcl", width::IP_FIELD)?;
    d.optional(" ", "ipProto", width::SHORT)?;
    Ok(())
}

pub(crate) fn trace_arp<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::ARP) {
        return Ok(());
    }

    let Some(operation) = d.field("arpOp", width::LONG) else {
        return Ok(());
    };

    d.out.emit(format_args!("{MARGIN}ARP {operation}"))?;
    d.optional(" hwtype=", "arpHwType", width::LONG)?;
    d.optional(" hwlen=", "arpHwLen", width::LONG)?;
    d.optional(" prot=", "arpPtcl", width::LONG)?;

    if let Some(sender) = d.field("arpSndAddr", width::LONG) {
        d.out.emit(format_args!("{MARGIN}snd={sender}"))?;
    }
    d.optional(" tgt=", "arpTgtAddr", width::LONG)?;
    d.optional(" snd_hw=", "arpSndHw", width::LONG)?;
    d.optional(" tgt_hw=", "arpTgtHw", width::LONG)?;
    Ok(())
}
