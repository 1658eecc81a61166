//! NetRom routing information: NODES broadcasts and INP3 unicasts
//!
//! Both carry a flat `nodes` array of per-destination entries. NODES entries
//! render on one line each. INP3 entries carry optional decorations that wrap
//! onto continuation lines at the configured display width.

use std::io::{self, Write};

use chrono::{DateTime, Local};
use pnmp_format::{find_array, get_value, parse_leading_int, ArrayElements, FieldValue};
use smallvec::SmallVec;

use crate::config::TraceFlags;
use crate::constants::{width, MARGIN, MIN_UNIX_TIMESTAMP};
use crate::dispatch::Decoder;

/// Routing information kind (`type`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingType {
    /// Classic NODES broadcast
    Nodes,
    /// INP3 routing unicast
    Inp3,
    /// Any other value
    Unrecognized(String),
}

impl From<&str> for RoutingType {
    fn from(value: &str) -> Self {
        match value {
            "NODES" => RoutingType::Nodes,
            "INP3" => RoutingType::Inp3,
            other => RoutingType::Unrecognized(other.to_string()),
        }
    }
}

/// INP3 capability fields and their labels, in display order
pub const CAPABILITIES: [(&str, &str); 7] = [
    ("isNode", "NODE"),
    ("isBBS", "BBS"),
    ("isPMS", "PMS"),
    ("isXRChat", "XRCHAT"),
    ("isRTChat", "RTCHAT"),
    ("isRMS", "RMS"),
    ("isDXClus", "DXCLUS"),
];

/// Labels of the capabilities an INP3 entry advertises as `true`
pub fn capability_tags(entry: &str) -> SmallVec<[&'static str; 7]> {
    CAPABILITIES
        .iter()
        .filter(|(field, _)| {
            get_value(entry, field, width::BOOLEAN).is_ok_and(|value| value == "true")
        })
        .map(|&(_, label)| label)
        .collect()
}

/// Render an INP3 timestamp.
///
/// Values containing `T` are ISO-8601 and shown as given. Anything else is
/// read as Unix seconds and shown in local time as `DD/MM HH:MM`; values at or
/// below [`MIN_UNIX_TIMESTAMP`] are treated as unset.
pub fn format_timestamp(value: &str) -> Option<String> {
    if value.contains('T') {
        return Some(value.to_string());
    }

    // Negative values wrap to large unsigned ones and are shown
    let seconds = parse_leading_int(value) as i32;
    if seconds as u32 <= MIN_UNIX_TIMESTAMP {
        return None;
    }
    let time = DateTime::from_timestamp(i64::from(seconds), 0)?.with_timezone(&Local);
    Some(time.format("%d/%m %H:%M").to_string())
}

pub(crate) fn trace_routing_info<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    let Some(kind) = d.field("type", width::SUBTYPE) else {
        return d.warn(format_args!(" [missing 'type']"));
    };

    match RoutingType::from(kind.as_str()) {
        RoutingType::Nodes => trace_nodes(d),
        RoutingType::Inp3 => trace_inp3(d),
        RoutingType::Unrecognized(value) => d.warn(format_args!(" [unknown 'type' '{value}']")),
    }
}

fn trace_nodes<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::NODES) {
        return d.out.put(" NODES Broadcast");
    }

    let Some(alias) = d.field("fromAlias", width::ALIAS) else {
        return d.warn(format_args!(" [missing 'fromAlias']"));
    };
    d.out.emit(format_args!("{MARGIN}NODES Broadcast from {alias}:"))?;

    // The "type":"NODES" value would match the key search, so look after the alias
    let object = d.object;
    let rest = &object.as_str()[alias.end()..];
    let Ok(start) = find_array(rest, "nodes") else {
        return d.warn(format_args!(" [missing 'nodes' array]"));
    };

    for element in ArrayElements::new(rest, start, d.max_element_chars) {
        let entry = element.text.as_str();
        d.out.margin()?;
        if let Ok(call) = get_value(entry, "call", width::NODE_CALL) {
            d.out.put(&call)?;
        }
        if let Ok(alias) = get_value(entry, "alias", width::ALIAS) {
            d.out.emit(format_args!(":{alias}"))?;
        }
        if let Ok(via) = get_value(entry, "via", width::NODE_CALL) {
            d.out.emit(format_args!(" via {via}"))?;
        }
        if let Ok(quality) = get_value(entry, "qual", width::QUALITY) {
            d.out.emit(format_args!(" qlty={quality}"))?;
        }
    }
    Ok(())
}

fn trace_inp3<W: Write>(d: &mut Decoder<'_, W>) -> io::Result<()> {
    if !d.enabled(TraceFlags::INP3) {
        return d.out.put(" INP3");
    }

    d.out.emit(format_args!("{MARGIN}INP3 Routing Unicast:"))?;

    let object = d.object;
    let Ok(start) = object.find_array("nodes") else {
        return d.warn(format_args!(" [missing 'nodes' array]"));
    };

    for element in ArrayElements::after(object.as_str(), start, d.max_element_chars) {
        trace_inp3_entry(d, &element.text)?;
    }
    Ok(())
}

fn trace_inp3_entry<W: Write>(d: &mut Decoder<'_, W>, entry: &str) -> io::Result<()> {
    let field = |name: &str, max_len: usize| get_value(entry, name, max_len).ok();
    let text = |value: Option<FieldValue>| value.map(FieldValue::into_string).unwrap_or_default();

    let call = text(field("call", width::NODE_CALL));
    let hops = text(field("hops", width::HOPS));
    let trip_time = text(field("tt", width::TRIP_TIME));
    d.out.margin()?;
    d.out.emit(format_args!("{call:<9}  hp={hops:<2}  tt={trip_time:<5}"))?;

    let mut decorations: Vec<String> = Vec::new();
    if let Some(alias) = field("alias", width::ALIAS) {
        decorations.push(format!("  Alias={:<6}", alias.as_str()));
    }
    if let Some(latitude) = field("latitude", width::DESCRIPTION) {
        decorations.push(format!(" {latitude}"));
    }
    if let Some(longitude) = field("longitude", width::DESCRIPTION) {
        decorations.push(format!(" {longitude}"));
    }
    if let Some(software) = field("software", width::DESCRIPTION) {
        decorations.push(format!(" S/W={software}"));
    }
    if let Some(version) = field("version", width::VERSION) {
        decorations.push(format!(" v{version}"));
    }
    decorations.extend(capability_tags(entry).into_iter().map(|tag| format!(" {tag}")));
    if let Some(timestamp) = field("timestamp", width::TIMESTAMP)
        .and_then(|value| format_timestamp(&value))
    {
        decorations.push(format!(" {timestamp}"));
    }
    if let Some(offset) = field("tzMins", width::SHORT) {
        decorations.push(format!(" tz={offset}"));
    }

    let display_width = d.config.display_width;
    for decoration in &decorations {
        d.out.soft_wrap(decoration.chars().count(), display_width)?;
        d.out.put(decoration)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceConfig;
    use crate::output::TraceOutput;
    use pnmp_format::RawObject;

    fn decode_with(config: &TraceConfig, text: &str) -> String {
        let object = RawObject::new(text);
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        let mut d = Decoder::new(&object, config, &mut out);
        trace_routing_info(&mut d).unwrap();
        String::from_utf8(out.into_display()).unwrap()
    }

    fn decode(flags: TraceFlags, text: &str) -> String {
        let config = TraceConfig {
            flags,
            ..TraceConfig::default()
        };
        decode_with(&config, text)
    }

    const NODES: &str = r#""l3Type":"Routing info","type":"NODES","fromAlias":"BDH","nodes":[{"call":"GB7ABC","alias":"ABC","via":"GB7XYZ","qual":200},{"call":"GB7DEF","qual":150}]"#;

    #[test]
    fn test_nodes_broadcast() {
        assert_eq!(
            decode(TraceFlags::default(), NODES),
            "\n    NODES Broadcast from BDH:\n    GB7ABC:ABC via GB7XYZ qlty=200\n    GB7DEF qlty=150"
        );
    }

    #[test]
    fn test_nodes_disabled_marker() {
        let flags = TraceFlags::default().difference(TraceFlags::NODES);
        assert_eq!(decode(flags, NODES), " NODES Broadcast");
    }

    #[test]
    fn test_nodes_missing_alias_and_array() {
        let flags = TraceFlags::default().union(TraceFlags::WARNINGS);
        assert_eq!(
            decode(flags, r#""type":"NODES","nodes":[]"#),
            " [missing 'fromAlias']"
        );
        assert_eq!(
            decode(flags, r#""type":"NODES","fromAlias":"BDH""#),
            "\n    NODES Broadcast from BDH: [missing 'nodes' array]"
        );
    }

    #[test]
    fn test_routing_type_warnings() {
        let flags = TraceFlags::default().union(TraceFlags::WARNINGS);
        assert_eq!(decode(flags, r#""l3Type":"Routing info""#), " [missing 'type']");
        assert_eq!(
            decode(flags, r#""type":"RIP""#),
            " [unknown 'type' 'RIP']"
        );
    }

    #[test]
    fn test_inp3_minimum_entry() {
        let text = decode(
            TraceFlags::default(),
            r#""type":"INP3","nodes":[{"call":"G8PZT"},{"call":"GB7BDH","hops":2,"tt":3}]"#,
        );
        assert_eq!(text, "\n    INP3 Routing Unicast:\n    GB7BDH     hp=2   tt=3    ");
    }

    #[test]
    fn test_inp3_first_entry_is_passed_over() {
        let text = decode(
            TraceFlags::default(),
            r#""type":"INP3","nodes":[{"call":"FIRST","hops":1,"tt":2},{"call":"SECOND","hops":3,"tt":4}]"#,
        );
        assert_eq!(text, "\n    INP3 Routing Unicast:\n    SECOND     hp=3   tt=4    ");

        let text = decode(
            TraceFlags::default(),
            r#""type":"INP3","nodes":[{"call":"ONLY","hops":1,"tt":2}]"#,
        );
        assert_eq!(text, "\n    INP3 Routing Unicast:");
    }

    #[test]
    fn test_inp3_absent_basics_are_padded() {
        let text = decode(TraceFlags::default(), r#""type":"INP3","nodes":[{},{"alias":"X"}]"#);
        assert_eq!(
            text,
            "\n    INP3 Routing Unicast:\n               hp=    tt=       Alias=X     "
        );
    }

    #[test]
    fn test_inp3_decorations_wrap() {
        let config = TraceConfig {
            display_width: 60,
            ..TraceConfig::default()
        };
        let text = decode_with(
            &config,
            r#""type":"INP3","nodes":[{"call":"G8PZT"},{"call":"GB7BDH","hops":2,"tt":3,"alias":"BDH","software":"XRPi","version":"504k","isNode":"true","isBBS":"false","isPMS":"true","timestamp":"2025-10-24T12:46:52Z"}]"#,
        );
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[1], "    INP3 Routing Unicast:");
        assert_eq!(
            lines[2],
            "    GB7BDH     hp=2   tt=3      Alias=BDH    S/W=XRPi v504k"
        );
        assert_eq!(lines[3], "         NODE PMS 2025-10-24T12:46:52Z");
        assert!(lines.iter().all(|line| line.chars().count() < 60));
    }

    #[test]
    fn test_inp3_disabled_marker() {
        let flags = TraceFlags::default().difference(TraceFlags::INP3);
        assert_eq!(decode(flags, r#""type":"INP3","nodes":[]"#), " INP3");
    }

    #[test]
    fn test_capability_tags() {
        let entry = r#"{"isNode":"true","isBBS":"false","isRMS":"true","isDXClus":"true"}"#;
        assert_eq!(capability_tags(entry).as_slice(), ["NODE", "RMS", "DXCLUS"]);
        assert!(capability_tags(r#"{"isRMS":"false"}"#).is_empty());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2025-10-24T12:46:52Z").as_deref(),
            Some("2025-10-24T12:46:52Z")
        );
        assert_eq!(format_timestamp("18000"), None);
        assert_eq!(format_timestamp("0"), None);
        let before_epoch = format_timestamp("-5").unwrap();
        assert_eq!(before_epoch.len(), "31/12 23:59".len());
        let shown = format_timestamp("1761310012").unwrap();
        assert_eq!(shown.len(), "24/10 12:46".len());
        assert_eq!(&shown[2..3], "/");
    }
}
