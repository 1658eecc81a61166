//! Per-run counters

use std::fmt;

use serde::Serialize;

use crate::dispatch::Disposition;

/// Counts of what happened to each framed object during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceStats {
    /// Top-level objects framed, oversize ones included
    pub objects: u64,
    /// Frames rendered
    pub traced: u64,
    /// Frames rejected by a filter
    pub filtered: u64,
    /// Objects without `@type`
    pub missing_kind: u64,
    /// Objects of a report kind that is not decoded
    pub unsupported_kind: u64,
    /// Frames missing a mandatory field
    pub missing_field: u64,
    /// Objects discarded for exceeding the size limit
    pub oversize: u64,
}

impl TraceStats {
    /// Count one decoded object
    pub fn record(&mut self, disposition: &Disposition) {
        self.objects += 1;
        match disposition {
            Disposition::Traced => self.traced += 1,
            Disposition::Filtered(_) => self.filtered += 1,
            Disposition::MissingKind => self.missing_kind += 1,
            Disposition::UnsupportedKind(_) => self.unsupported_kind += 1,
            Disposition::MissingField(_) => self.missing_field += 1,
        }
    }

    /// Count one object discarded for size
    pub fn record_oversize(&mut self) {
        self.objects += 1;
        self.oversize += 1;
    }

    /// Objects that were neither traced nor filtered
    pub fn dropped(&self) -> u64 {
        self.missing_kind + self.unsupported_kind + self.missing_field + self.oversize
    }
}

impl fmt::Display for TraceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects: {} traced, {} filtered, {} dropped",
            self.objects,
            self.traced,
            self.filtered,
            self.dropped()
        )?;
        if self.oversize > 0 {
            write!(f, " ({} oversize)", self.oversize)?;
        }
        Ok(())
    }
}
