//! Frame acceptance against the configured filters
//!
//! Criteria are checked in a fixed order and the first failure rejects the
//! frame. String criteria compare case-insensitively.

use pnmp_format::parse_leading_int;

use crate::config::{TraceConfig, TraceFlags};
use crate::frame::FrameContext;

/// The criterion that rejected a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// UI frame while UI tracing is off
    UiDisabled,
    /// Reporting node differs
    Reporter,
    /// Port number differs
    Port,
    /// Frame type differs
    FrameType,
    /// Source callsign differs
    Source,
    /// Destination callsign differs
    Destination,
    /// Neither callsign matches
    EitherCall,
    /// Protocol differs or is absent
    Protocol,
}

impl Rejection {
    /// Short name for logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::UiDisabled => "ui-disabled",
            Rejection::Reporter => "reporter",
            Rejection::Port => "port",
            Rejection::FrameType => "frame-type",
            Rejection::Source => "source",
            Rejection::Destination => "destination",
            Rejection::EitherCall => "either-call",
            Rejection::Protocol => "protocol",
        }
    }
}

/// Check a frame against every criterion in order
pub fn check(ctx: &FrameContext, config: &TraceConfig) -> Result<(), Rejection> {
    let filters = &config.filters;

    if ctx.frame_type == "UI" && !config.enabled(TraceFlags::UI) {
        return Err(Rejection::UiDisabled);
    }

    if !matches_optional(filters.reporter.as_deref(), &ctx.reporter) {
        return Err(Rejection::Reporter);
    }

    if filters.port != 0 && parse_leading_int(&ctx.port) != i64::from(filters.port) {
        return Err(Rejection::Port);
    }

    if !matches_optional(filters.frame_type.as_deref(), &ctx.frame_type) {
        return Err(Rejection::FrameType);
    }

    if !matches_optional(filters.source.as_deref(), &ctx.source) {
        return Err(Rejection::Source);
    }

    if !matches_optional(filters.destination.as_deref(), &ctx.destination) {
        return Err(Rejection::Destination);
    }

    if let Some(call) = filters.either.as_deref() {
        if !ctx.source.eq_ignore_ascii_case(call) && !ctx.destination.eq_ignore_ascii_case(call) {
            return Err(Rejection::EitherCall);
        }
    }

    if let Some(protocol) = filters.protocol.as_deref() {
        match ctx.protocol.as_deref() {
            Some(p) if !p.is_empty() && p.eq_ignore_ascii_case(protocol) => {}
            _ => return Err(Rejection::Protocol),
        }
    }

    Ok(())
}

fn matches_optional(filter: Option<&str>, value: &str) -> bool {
    filter.map_or(true, |wanted| value.eq_ignore_ascii_case(wanted))
}
