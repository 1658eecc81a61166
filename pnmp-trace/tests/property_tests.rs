//! Property-based tests for the trace engine

use pnmp_trace::{trace_stream, Filters, TraceConfig, TraceFlags, TraceOutput};
use proptest::prelude::*;

fn frame(reporter: &str, port: u32, source: &str, destination: &str, l2_type: &str) -> String {
    format!(
        r#"{{"@type":"L2Trace","reportFrom":"{reporter}","port":"{port}","srce":"{source}","dest":"{destination}","l2Type":"{l2_type}","ptcl":"DATA","info":"x"}}"#
    )
}

fn callsign() -> impl Strategy<Value = String> {
    "[A-Z0-9]{3,6}(-[0-9]{1,2})?"
}

fn plain() -> TraceFlags {
    TraceFlags::default()
        .difference(TraceFlags::COLOR)
        .difference(TraceFlags::STAMP)
        .difference(TraceFlags::LINE_BREAK)
}

proptest! {
    #[test]
    fn arbitrary_input_never_fails(input in prop::collection::vec(any::<u8>(), 0..512), bits in any::<u32>()) {
        let config = TraceConfig {
            flags: TraceFlags::from_bits_truncate(bits),
            ..TraceConfig::default()
        };
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        prop_assert!(trace_stream(&input[..], &config, &mut out).is_ok());
    }

    #[test]
    fn every_rendered_frame_ends_its_line(
        frames in prop::collection::vec((callsign(), 1u32..9, callsign(), callsign()), 1..10),
    ) {
        let input: String = frames
            .iter()
            .map(|(reporter, port, source, destination)| frame(reporter, *port, source, destination, "I"))
            .collect();
        let config = TraceConfig { flags: plain(), ..TraceConfig::default() };
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        let stats = trace_stream(input.as_bytes(), &config, &mut out).unwrap();

        let text = String::from_utf8(out.into_display()).unwrap();
        prop_assert_eq!(stats.traced as usize, frames.len());
        prop_assert_eq!(text.matches(" DATA:\n    x\n").count(), frames.len());
    }

    #[test]
    fn source_filter_selects_matching_frames(
        frames in prop::collection::vec((callsign(), callsign()), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let wanted = frames[pick.index(frames.len())].0.clone();
        let input: String = frames
            .iter()
            .map(|(source, destination)| frame("G8PZT", 1, source, destination, "I"))
            .collect();
        let config = TraceConfig {
            filters: Filters { source: Some(wanted.to_lowercase()), ..Filters::default() },
            flags: plain(),
            ..TraceConfig::default()
        };
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        let stats = trace_stream(input.as_bytes(), &config, &mut out).unwrap();

        let expected = frames.iter().filter(|(source, _)| *source == wanted).count() as u64;
        prop_assert_eq!(stats.traced, expected);
        prop_assert_eq!(stats.traced + stats.filtered, frames.len() as u64);
    }

    #[test]
    fn disabling_ui_filters_only_ui_frames(types in prop::collection::vec(prop::sample::select(vec!["UI", "I", "RR", "SABM"]), 1..10)) {
        let input: String = types
            .iter()
            .map(|l2_type| frame("G8PZT", 1, "A", "B", l2_type))
            .collect();
        let config = TraceConfig {
            flags: plain().difference(TraceFlags::UI),
            ..TraceConfig::default()
        };
        let mut out = TraceOutput::new(Vec::new(), config.flags);
        let stats = trace_stream(input.as_bytes(), &config, &mut out).unwrap();

        let ui = types.iter().filter(|t| **t == "UI").count() as u64;
        prop_assert_eq!(stats.filtered, ui);
        prop_assert_eq!(stats.traced, types.len() as u64 - ui);
    }
}
