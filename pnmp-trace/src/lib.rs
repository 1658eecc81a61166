//! PNMP Trace - Packet trace rendering for PNMP reports
//!
//! This crate turns a stream of Packet Network Monitoring Project reports into
//! human-readable packet traces:
//!
//! - Trace configuration: filters, display flags and width
//! - Frame filtering
//! - Link, NetRom, routing, transport, IP and ARP decoding
//! - Output to a display and an optional capture sink
//! - Per-run statistics
//!
//! Malformed or unexpected input never aborts a run. Only I/O errors on the
//! input or the output sinks are returned.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod frame;
mod ip;
pub mod netrom;
pub mod output;
pub mod routing;
pub mod stats;
pub mod transport;

// Re-export commonly used types
pub use config::{filter_value, Filters, TraceConfig, TraceFlags};
pub use dispatch::{Clock, Disposition, Tracer};
pub use error::{Result, TraceError};
pub use filter::Rejection;
pub use frame::{Direction, FrameContext, Protocol, ReportKind, RfState};
pub use netrom::L3Type;
pub use output::TraceOutput;
pub use pnmp_format::{Framed, Limits, RawObject};
pub use routing::RoutingType;
pub use stats::TraceStats;
pub use transport::L4Type;

use std::io::{BufRead, BufReader, Read, Write};

use pnmp_format::Objects;

/// Trace every report read from `input` with default limits and the system clock
pub fn trace_stream<R: Read, W: Write>(
    input: R,
    config: &TraceConfig,
    output: &mut TraceOutput<W>,
) -> Result<TraceStats> {
    trace_with(&Tracer::new(config), BufReader::new(input), output)
}

/// Trace every report read from `input` with an explicitly configured tracer
pub fn trace_with<R: BufRead, W: Write>(
    tracer: &Tracer<'_>,
    input: R,
    output: &mut TraceOutput<W>,
) -> Result<TraceStats> {
    tracer.config().validate()?;

    let mut stats = TraceStats::default();
    for framed in Objects::with_limits(input, tracer.limits()) {
        match framed? {
            Framed::Object(object) => {
                let disposition = tracer.trace(&object, output)?;
                stats.record(&disposition);
            }
            Framed::Oversize { len } => {
                tracing::warn!(
                    len,
                    limit = tracer.limits().max_object_bytes,
                    "discarding oversize object"
                );
                stats.record_oversize();
            }
        }
    }

    output.flush()?;
    tracing::debug!(
        objects = stats.objects,
        traced = stats.traced,
        filtered = stats.filtered,
        dropped = stats.dropped(),
        "input exhausted"
    );
    Ok(stats)
}
