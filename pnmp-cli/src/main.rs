//! pnmptrace - Packet trace decoder for PNMP report streams
//!
//! Reads a stream of JSON reports from stdin (or `--input`), renders every
//! `L2Trace` report that passes the filters as a readable packet trace on
//! stdout, and optionally mirrors the traces into a capture file.
//!
//! Settings are layered: built-in defaults, then `--config FILE`, then the
//! command-line options. Startup notices, logs and the run summary go to
//! stderr so stdout carries trace text only.

mod settings;

use clap::{Parser, ValueEnum};
use pnmp_trace::{
    filter_value, trace_with, TraceConfig, TraceError, TraceFlags, TraceOutput, TraceStats, Tracer,
};
use settings::FileSettings;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pnmptrace")]
#[command(about = "JSON to AX.25 packet trace decoder for PNMP")]
#[command(version)]
struct Cli {
    /// Don't trace NetRom layer 3 or above
    #[arg(short = '3', long = "no-netrom")]
    no_netrom: bool,
    /// Don't trace NetRom layer 4 or above
    #[arg(short = '4', long = "no-l4")]
    no_l4: bool,
    /// Show ALL frames to or from <CALLSIGN>
    #[arg(short = 'a', long = "call", value_name = "CALLSIGN")]
    either: Option<String>,
    /// Disable colors
    #[arg(short = 'c', long = "no-color")]
    no_color: bool,
    /// Send color codes to the capture file too
    #[arg(short = 'C', long = "color-to-capture")]
    color_to_capture: bool,
    /// Show only frames FROM <CALLSIGN>
    #[arg(short = 'f', long = "from", value_name = "CALLSIGN")]
    source: Option<String>,
    /// Show the report header on its own line
    #[arg(short = 'H', long = "header-line")]
    header_line: bool,
    /// Don't decode INP3 routing unicasts
    #[arg(short = 'i', long = "no-inp3")]
    no_inp3: bool,
    /// Show the JSON report before each trace
    #[arg(short = 'j', long = "json")]
    raw_json: bool,
    /// Don't show the contents of L3RTT frames
    #[arg(short = 'k', long = "no-l3rtt")]
    no_l3rtt: bool,
    /// No blank line between traces
    #[arg(short = 'l', long = "no-line-break")]
    no_line_break: bool,
    /// Don't decode NODES broadcasts
    #[arg(short = 'n', long = "no-nodes")]
    no_nodes: bool,
    /// Capture traces to <FILE>, truncating it first
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    capture: Option<PathBuf>,
    /// Show only frames to/from port <PORT>
    #[arg(short = 'p', long = "port")]
    port: Option<u32>,
    /// Show only frames with L3 protocol <PROTOCOL>
    #[arg(short = 'P', long = "protocol")]
    protocol: Option<String>,
    /// Quiet: traces go to the capture file only
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
    /// Show only reports from node <CALLSIGN>
    #[arg(short = 'r', long = "reporter", value_name = "CALLSIGN")]
    reporter: Option<String>,
    /// Don't time-stamp traces
    #[arg(short = 's', long = "no-stamp")]
    no_stamp: bool,
    /// Show only frames TO <CALLSIGN>
    #[arg(short = 't', long = "to", value_name = "CALLSIGN")]
    destination: Option<String>,
    /// Show only frames of L2 type <TYPE>, e.g. UI or SABM
    #[arg(short = 'T', long = "type", value_name = "TYPE")]
    frame_type: Option<String>,
    /// Don't show UI frames
    #[arg(short = 'u', long = "no-ui")]
    no_ui: bool,
    /// Display width used to wrap INP3 entries
    #[arg(short = 'w', long = "width")]
    width: Option<usize>,
    /// Show warnings about missing or unknown fields
    #[arg(short = 'W', long = "warnings")]
    warnings: bool,
    /// Read reports from <FILE> instead of stdin
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Load settings from a TOML file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print run statistics to stderr on exit
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "text", value_name = "FORMAT")]
    summary: Option<SummaryFormat>,
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

/// Everything a run needs once the settings layers are merged
#[derive(Debug)]
struct RunSettings {
    config: TraceConfig,
    capture: Option<PathBuf>,
}

impl Cli {
    fn resolve(&self, file: &FileSettings) -> RunSettings {
        let mut config = TraceConfig::default();
        file.apply(&mut config);

        let filters = [
            (&self.reporter, &mut config.filters.reporter),
            (&self.source, &mut config.filters.source),
            (&self.destination, &mut config.filters.destination),
            (&self.either, &mut config.filters.either),
            (&self.protocol, &mut config.filters.protocol),
            (&self.frame_type, &mut config.filters.frame_type),
        ];
        for (value, target) in filters {
            if let Some(value) = value {
                *target = filter_value(value);
            }
        }
        if let Some(port) = self.port {
            config.filters.port = port;
        }
        if let Some(width) = self.width {
            config.display_width = width;
        }

        let flags = &mut config.flags;
        let cleared = [
            (self.no_netrom, TraceFlags::NETROM),
            (self.no_l4, TraceFlags::L4),
            (self.no_color, TraceFlags::COLOR),
            (self.no_inp3, TraceFlags::INP3),
            (self.no_l3rtt, TraceFlags::L3RTT),
            (self.no_line_break, TraceFlags::LINE_BREAK),
            (self.no_nodes, TraceFlags::NODES),
            (self.no_stamp, TraceFlags::STAMP),
            (self.no_ui, TraceFlags::UI),
        ];
        let raised = [
            (self.color_to_capture, TraceFlags::COLOR_TO_CAPTURE),
            (self.header_line, TraceFlags::HEADER_LINE),
            (self.raw_json, TraceFlags::RAW_JSON),
            (self.quiet, TraceFlags::QUIET),
            (self.warnings, TraceFlags::WARNINGS),
        ];
        for (given, flag) in cleared {
            if given {
                flags.set(flag, false);
            }
        }
        for (given, flag) in raised {
            if given {
                flags.set(flag, true);
            }
        }

        RunSettings {
            config,
            capture: self
                .capture
                .clone()
                .or_else(|| file.display.capture.clone()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file = match &cli.config {
        Some(path) => FileSettings::load(path).map_err(|err| err.to_string())?,
        None => FileSettings::default(),
    };
    let run = cli.resolve(&file);
    run.config.validate().map_err(|err| err.to_string())?;
    tracing::debug!(config = ?run.config, capture = ?run.capture, "settings resolved");

    let mut output = TraceOutput::new(io::stdout().lock(), run.config.flags);
    if let Some(path) = &run.capture {
        output = output.with_capture(Box::new(BufWriter::new(open_capture(path)?)));
    }
    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|err| {
            format!("Can't open input file '{}': {err}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    {
        let mut stderr = io::stderr().lock();
        write_banner(&mut stderr, std::env::args_os().len() <= 1)?;
        for notice in startup_notices(&run) {
            writeln!(&mut stderr, "{notice}")?;
        }
    }
    if run.config.enabled(TraceFlags::QUIET) && run.capture.is_none() {
        tracing::warn!("quiet mode without a capture file discards every trace");
    }

    let stats = match trace_with(&Tracer::new(&run.config), input, &mut output) {
        Ok(stats) => stats,
        // Downstream pager or `head` went away
        Err(TraceError::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
            output.close_capture()?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    output.close_capture()?;

    if let Some(format) = cli.summary {
        write_summary(&mut io::stderr().lock(), &stats, format)?;
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_capture(path: &Path) -> Result<File, Box<dyn Error>> {
    File::create(path)
        .map_err(|err| format!("Can't open capture file '{}': {err}", path.display()).into())
}

fn write_banner<W: Write>(out: &mut W, hint: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "\"pnmptrace\" JSON to AX25 Trace Decoder for PNMP")?;
    writeln!(out, "Version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    if hint {
        writeln!(out, "Use 'pnmptrace -h' to display help, Ctrl-C exits")?;
    }
    Ok(())
}

/// One line per active filter and per disabled decoder
fn startup_notices(run: &RunSettings) -> Vec<String> {
    let config = &run.config;
    let filters = &config.filters;
    let mut notices = Vec::new();

    if let Some(path) = &run.capture {
        notices.push(format!("Capturing traces to file '{}'", path.display()));
    }
    if let Some(reporter) = &filters.reporter {
        notices.push(format!("Showing reports from node '{reporter}' only"));
    }
    if filters.port != 0 {
        notices.push(format!("Showing frames to/from port ({}) only", filters.port));
    }
    if let Some(source) = &filters.source {
        notices.push(format!("Showing frames with L2 source call '{source}' only"));
    }
    if let Some(destination) = &filters.destination {
        notices.push(format!(
            "Showing frames with L2 destination call '{destination}' only"
        ));
    }
    if let Some(call) = &filters.either {
        notices.push(format!("Showing frames to/from L2 call '{call}' only"));
    }
    if let Some(frame_type) = &filters.frame_type {
        notices.push(format!("Showing '{frame_type}' frames only"));
    }
    if let Some(protocol) = &filters.protocol {
        notices.push(format!("Showing frames with L3 protocol '{protocol}' only"));
    }

    let disabled = [
        (TraceFlags::UI, "Not showing UI frames"),
        (TraceFlags::NODES, "Not decoding NODES broadcasts"),
        (TraceFlags::INP3, "Not decoding INP3 unicasts"),
        (TraceFlags::NETROM, "Not decoding NetRom Layer 3 or above"),
        (TraceFlags::L4, "Not decoding NetRom Layer 4 or above"),
        (TraceFlags::L3RTT, "Not showing L3RTT frame contents"),
        (TraceFlags::STAMP, "Time stamp disabled"),
    ];
    for (flag, notice) in disabled {
        if !config.enabled(flag) {
            notices.push(notice.to_string());
        }
    }
    if config.enabled(TraceFlags::RAW_JSON) {
        notices.push("Including JSON data".to_string());
    }
    notices
}

fn write_summary<W: Write>(
    out: &mut W,
    stats: &TraceStats,
    format: SummaryFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        SummaryFormat::Text => writeln!(out, "{stats}")?,
        SummaryFormat::Json => writeln!(out, "{}", serde_json::to_string(stats)?)?,
    }
    Ok(())
}
