//! Per-frame decode and rendering
//!
//! [`Tracer::trace`] takes one framed object from report-kind check through
//! filtering to the fully rendered trace. Protocol-specific decoders share a
//! [`Decoder`] that borrows the object, the configuration and the output.

use std::fmt;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use pnmp_format::{parse_leading_int, FieldValue, Limits, RawObject};

use crate::config::{TraceConfig, TraceFlags};
use crate::constants::{width, MARGIN};
use crate::error::Result;
use crate::filter::{self, Rejection};
use crate::frame::{frame_color, FrameContext, Protocol, RfState, ReportKind};
use crate::output::TraceOutput;
use crate::{ip, netrom};

/// What happened to one framed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Rendered to the output
    Traced,
    /// Rejected by a filter
    Filtered(Rejection),
    /// No `@type` field
    MissingKind,
    /// A report kind this tracer does not decode
    UnsupportedKind(String),
    /// A mandatory link-layer field was absent
    MissingField(&'static str),
}

/// Source of wall-clock time for frames without their own timestamp
pub type Clock = fn() -> DateTime<Utc>;

/// Renders framed objects according to a fixed configuration
#[derive(Debug, Clone)]
pub struct Tracer<'a> {
    config: &'a TraceConfig,
    limits: Limits,
    clock: Clock,
}

impl<'a> Tracer<'a> {
    /// Tracer using the system clock
    pub fn new(config: &'a TraceConfig) -> Self {
        Self {
            config,
            limits: Limits::default(),
            clock: Utc::now,
        }
    }

    /// Replace the scanning limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &TraceConfig {
        self.config
    }

    /// The scanning limits in use
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Decode and render one object
    pub fn trace<W: Write>(
        &self,
        object: &RawObject,
        out: &mut TraceOutput<W>,
    ) -> Result<Disposition> {
        let warnings = self.config.enabled(TraceFlags::WARNINGS);

        let Ok(kind) = object.get("@type", width::REPORT_KIND) else {
            tracing::debug!("dropping object without @type");
            if warnings {
                out.diagnostic("[missing '@type']")?;
            }
            return Ok(Disposition::MissingKind);
        };

        if let ReportKind::Unrecognized(kind) = ReportKind::from(kind.as_str()) {
            tracing::debug!(%kind, "dropping unsupported report kind");
            return Ok(Disposition::UnsupportedKind(kind));
        }

        let ctx = match FrameContext::extract(object) {
            Ok(ctx) => ctx,
            Err(field) => {
                tracing::debug!(field, "dropping frame with missing mandatory field");
                if warnings {
                    out.diagnostic(&format!("[mandatory field '{field}' missing]"))?;
                }
                return Ok(Disposition::MissingField(field));
            }
        };

        if let Err(rejection) = filter::check(&ctx, self.config) {
            tracing::debug!(
                reason = rejection.as_str(),
                reporter = %ctx.reporter,
                source = %ctx.source,
                destination = %ctx.destination,
                "frame filtered"
            );
            return Ok(Disposition::Filtered(rejection));
        }

        out.begin_frame();
        let mut decoder = Decoder {
            object,
            config: self.config,
            out,
            max_element_chars: self.limits.max_element_chars,
        };
        self.render(&mut decoder, &ctx)?;
        decoder.out.flush()?;

        Ok(Disposition::Traced)
    }

    fn render<W: Write>(&self, d: &mut Decoder<'_, W>, ctx: &FrameContext) -> io::Result<()> {
        if d.enabled(TraceFlags::COLOR) {
            d.out.color(frame_color(ctx.rf_state(), ctx.direction()))?;
        }

        if d.enabled(TraceFlags::RAW_JSON) {
            d.out.emit(format_args!("{}\n", d.object))?;
        }

        if d.enabled(TraceFlags::LINE_BREAK) {
            d.out.put("\n")?;
        }

        if d.enabled(TraceFlags::STAMP) {
            let time = match d.field("time", width::TIME) {
                Some(value) => {
                    DateTime::from_timestamp(parse_leading_int(&value), 0).unwrap_or_default()
                }
                None => (self.clock)(),
            };
            d.out.emit(format_args!("{} ", time.format("%H:%M:%S")))?;
        }

        render_metadata(d, ctx)?;
        render_link_header(d, ctx)?;

        match ctx.protocol_kind() {
            Some(Protocol::NetRom) => netrom::trace_netrom(d)?,
            Some(Protocol::Data) => trace_data(d)?,
            Some(Protocol::Ip) => ip::trace_ip(d)?,
            Some(Protocol::Arp) => ip::trace_arp(d)?,
            Some(Protocol::Unrecognized(_)) | None => {}
        }

        d.out.put("\n")
    }
}

fn render_metadata<W: Write>(d: &mut Decoder<'_, W>, ctx: &FrameContext) -> io::Result<()> {
    let direction = ctx.direction.as_deref().unwrap_or_default();

    if d.enabled(TraceFlags::HEADER_LINE) {
        d.out.emit(format_args!("{} port {}", ctx.reporter, ctx.port))?;
        match ctx.rf.as_deref() {
            Some("") | None => {}
            Some(_) if ctx.rf_state() == RfState::Rf => d.out.put(" (RF)")?,
            Some(_) => d.out.put(" (Non-RF)")?,
        }
        if !direction.is_empty() {
            d.out.emit(format_args!(" {direction}"))?;
        }
        d.out.put(":\n  ")
    } else {
        let marker = direction
            .chars()
            .next()
            .map_or(' ', |c| c.to_ascii_uppercase());
        d.out.emit(format_args!("{}({}){} ", ctx.reporter, ctx.port, marker))
    }
}

fn render_link_header<W: Write>(d: &mut Decoder<'_, W>, ctx: &FrameContext) -> io::Result<()> {
    d.out.emit(format_args!(
        "{}>{}<{}",
        ctx.source, ctx.destination, ctx.frame_type
    ))?;

    d.optional(" ", "cr", width::CONTROL)?;
    d.optional(" ", "pf", width::CONTROL)?;
    d.optional(" R", "rseq", width::SEQUENCE)?;
    d.optional(" S", "tseq", width::SEQUENCE)?;
    d.out.put(">")?;

    d.optional(" ilen=", "ilen", width::INFO_LEN)?;
    d.optional(" pid=", "pid", width::INFO_LEN)?;
    if let Some(protocol) = ctx.protocol.as_deref().filter(|p| !p.is_empty()) {
        d.out.emit(format_args!(" {protocol}"))?;
    }
    Ok(())
}

/// Plain payload: inline text for UI frames, otherwise the CRC of I frames
fn trace_data<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if let Some(info) = d.field("info", width::INFO) {
        d.out.emit(format_args!(":{MARGIN}{info}"))
    } else {
        d.optional(" CRC=", "icrc", width::SHORT).map(drop)
    }
}

/// Borrowed state shared by the protocol decoders of one frame
pub(crate) struct Decoder<'a, W: Write> {
    pub(crate) object: &'a RawObject,
    pub(crate) config: &'a TraceConfig,
    pub(crate) out: &'a mut TraceOutput<W>,
    pub(crate) max_element_chars: usize,
}

impl<'a, W: Write> Decoder<'a, W> {
    #[cfg(test)]
    pub(crate) fn new(
        object: &'a RawObject,
        config: &'a TraceConfig,
        out: &'a mut TraceOutput<W>,
    ) -> Self {
        Self {
            object,
            config,
            out,
            max_element_chars: Limits::default().max_element_chars,
        }
    }

    pub(crate) fn enabled(&self, flag: TraceFlags) -> bool {
        self.config.enabled(flag)
    }

    pub(crate) fn field(&self, name: &str, max_len: usize) -> Option<FieldValue> {
        self.object.get(name, max_len).ok()
    }

    /// Emit `prefix` and the value of `name` if the field is present
    pub(crate) fn optional(&mut self, prefix: &str, name: &str, max_len: usize) -> io::Result<bool> {
        match self.field(name, max_len) {
            Some(value) => {
                self.out.emit(format_args!("{prefix}{value}"))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Inline diagnostic, shown only with warnings enabled
    pub(crate) fn warn(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        tracing::debug!(detail = %args, "decode warning");
        if self.enabled(TraceFlags::WARNINGS) {
            self.out.emit(args)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Filters;

    const UI_FRAME: &str = r#""@type":"L2Trace","reportFrom":"G8PZT","port":"2","srce":"G8PZT-1","dest":"G8PZT-2","l2Type":"UI","ptcl":"DATA","info":"hello""#;

    fn plain() -> TraceConfig {
        TraceConfig {
            flags: TraceFlags::default()
                .difference(TraceFlags::COLOR)
                .difference(TraceFlags::STAMP)
                .difference(TraceFlags::LINE_BREAK),
            ..TraceConfig::default()
        }
    }

    fn render(config: &TraceConfig, text: &str) -> (Disposition, String) {
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        let disposition = Tracer::new(config)
            .with_clock(|| DateTime::from_timestamp(3_723, 0).unwrap_or_default())
            .trace(&RawObject::new(text), &mut out)
            .unwrap();
        (disposition, String::from_utf8(out.into_display()).unwrap())
    }

    #[test]
    fn test_ui_data_frame() {
        let (disposition, text) = render(&plain(), UI_FRAME);
        assert_eq!(disposition, Disposition::Traced);
        assert_eq!(text, "G8PZT(2)  G8PZT-1>G8PZT-2<UI> DATA:\n    hello\n");
    }

    #[test]
    fn test_default_layout_has_color_break_and_stamp() {
        let frame = format!(r#"{UI_FRAME},"time":3723,"dirn":"rcvd","isRF":"true""#);
        let (_, text) = render(&TraceConfig::default(), &frame);
        assert_eq!(
            text,
            "\x1b[92m\n01:02:03 G8PZT(2)R G8PZT-1>G8PZT-2<UI> DATA:\n    hello\n"
        );
    }

    #[test]
    fn test_wall_clock_when_frame_has_no_time() {
        let config = TraceConfig {
            flags: plain().flags.union(TraceFlags::STAMP),
            ..TraceConfig::default()
        };
        let (_, text) = render(&config, UI_FRAME);
        assert!(text.starts_with("01:02:03 G8PZT(2)"));
    }

    #[test]
    fn test_header_line_layout() {
        let config = TraceConfig {
            flags: plain().flags.union(TraceFlags::HEADER_LINE),
            ..TraceConfig::default()
        };
        let frame = format!(r#"{UI_FRAME},"dirn":"sent","isRF":"false""#);
        let (_, text) = render(&config, &frame);
        assert_eq!(
            text,
            "G8PZT port 2 (Non-RF) sent:\n  G8PZT-1>G8PZT-2<UI> DATA:\n    hello\n"
        );
    }

    #[test]
    fn test_link_header_subfields() {
        let frame = r#""@type":"L2Trace","reportFrom":"GB7BDH","port":"1","srce":"M0ABC","dest":"GB7BDH","l2Type":"I","cr":"C","pf":"P","rseq":3,"tseq":5,"ilen":120,"pid":240,"ptcl":"DATA","icrc":"AB12""#;
        let (_, text) = render(&plain(), frame);
        assert_eq!(
            text,
            "GB7BDH(1)  M0ABC>GB7BDH<I C P R3 S5> ilen=120 pid=240 DATA CRC=AB12\n"
        );
    }

    #[test]
    fn test_raw_json_echo() {
        let config = TraceConfig {
            flags: plain().flags.union(TraceFlags::RAW_JSON),
            ..TraceConfig::default()
        };
        let (_, text) = render(&config, UI_FRAME);
        assert!(text.starts_with(&format!("{UI_FRAME}\n")));
        assert!(!text.starts_with('{'));
    }

    #[test]
    fn test_missing_field_is_dropped() {
        let frame = UI_FRAME.replace(r#""dest":"G8PZT-2","#, "");
        let (disposition, text) = render(&plain(), &frame);
        assert_eq!(disposition, Disposition::MissingField("dest"));
        assert_eq!(text, "");

        let config = TraceConfig {
            flags: plain().flags.union(TraceFlags::WARNINGS),
            ..TraceConfig::default()
        };
        let (_, text) = render(&config, &frame);
        assert_eq!(text, "[mandatory field 'dest' missing]\n");
    }

    #[test]
    fn test_other_report_kinds_are_silent() {
        let config = TraceConfig {
            flags: plain().flags.union(TraceFlags::WARNINGS),
            ..TraceConfig::default()
        };
        let (disposition, text) = render(&config, r#""@type":"NodeUpStatus","node":"G8PZT""#);
        assert_eq!(
            disposition,
            Disposition::UnsupportedKind("NodeUpStatus".to_string())
        );
        assert_eq!(text, "");

        let (disposition, text) = render(&config, r#""node":"G8PZT""#);
        assert_eq!(disposition, Disposition::MissingKind);
        assert_eq!(text, "[missing '@type']\n");
    }

    #[test]
    fn test_filtered_frame_renders_nothing() {
        let config = TraceConfig {
            filters: Filters {
                port: 3,
                ..Filters::default()
            },
            ..plain()
        };
        let (disposition, text) = render(&config, UI_FRAME);
        assert_eq!(disposition, Disposition::Filtered(Rejection::Port));
        assert_eq!(text, "");
    }

    #[test]
    fn test_unrecognized_protocol_is_named_only() {
        let frame = UI_FRAME.replace("DATA", "FLEXNET");
        let (_, text) = render(&plain(), &frame);
        assert_eq!(text, "G8PZT(2)  G8PZT-1>G8PZT-2<UI> FLEXNET\n");
    }
}
