//! TOML settings file layered between the built-in defaults and the command line

use std::fs;
use std::path::{Path, PathBuf};

use pnmp_trace::{filter_value, TraceConfig, TraceFlags};
use serde::Deserialize;
use thiserror::Error;

/// Failure to load a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Can't read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of a settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub filters: FilterSection,
    pub display: DisplaySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub reporter: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub either: Option<String>,
    pub protocol: Option<String>,
    pub frame_type: Option<String>,
    pub port: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    pub width: Option<usize>,
    /// Capture file, truncated at start of run
    pub capture: Option<PathBuf>,
    pub ui: Option<bool>,
    pub netrom: Option<bool>,
    pub l3rtt: Option<bool>,
    pub nodes: Option<bool>,
    pub inp3: Option<bool>,
    pub l4: Option<bool>,
    pub ip: Option<bool>,
    pub arp: Option<bool>,
    pub color: Option<bool>,
    pub color_to_capture: Option<bool>,
    pub stamp: Option<bool>,
    pub line_break: Option<bool>,
    pub header_line: Option<bool>,
    pub raw_json: Option<bool>,
    pub quiet: Option<bool>,
    pub warnings: Option<bool>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay the keys present in the file onto `config`
    pub fn apply(&self, config: &mut TraceConfig) {
        let filters = &self.filters;
        let targets = [
            (&filters.reporter, &mut config.filters.reporter),
            (&filters.source, &mut config.filters.source),
            (&filters.destination, &mut config.filters.destination),
            (&filters.either, &mut config.filters.either),
            (&filters.protocol, &mut config.filters.protocol),
            (&filters.frame_type, &mut config.filters.frame_type),
        ];
        for (value, target) in targets {
            if let Some(value) = value {
                *target = filter_value(value);
            }
        }
        if let Some(port) = filters.port {
            config.filters.port = port;
        }

        let display = &self.display;
        if let Some(width) = display.width {
            config.display_width = width;
        }
        let switches = [
            (display.ui, TraceFlags::UI),
            (display.netrom, TraceFlags::NETROM),
            (display.l3rtt, TraceFlags::L3RTT),
            (display.nodes, TraceFlags::NODES),
            (display.inp3, TraceFlags::INP3),
            (display.l4, TraceFlags::L4),
            (display.ip, TraceFlags::IP),
            (display.arp, TraceFlags::ARP),
            (display.color, TraceFlags::COLOR),
            (display.color_to_capture, TraceFlags::COLOR_TO_CAPTURE),
            (display.stamp, TraceFlags::STAMP),
            (display.line_break, TraceFlags::LINE_BREAK),
            (display.header_line, TraceFlags::HEADER_LINE),
            (display.raw_json, TraceFlags::RAW_JSON),
            (display.quiet, TraceFlags::QUIET),
            (display.warnings, TraceFlags::WARNINGS),
        ];
        for (value, flag) in switches {
            if let Some(on) = value {
                config.flags.set(flag, on);
            }
        }
    }
}
