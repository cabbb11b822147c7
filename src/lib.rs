//! The check_storsafe crate queries a FalconStor StorSafe appliance over SNMP and turns its cache
//! and cluster storage counters into a nagios check result.

use std::cmp::Ordering;
use std::fmt;

#[macro_use]
mod macros;

pub mod check;
pub mod config_generator;
pub mod error;
mod helper;
pub mod metric;
pub mod report;
pub mod runner;
pub mod snmp;

pub use crate::check::{evaluate, CheckType, Thresholds};
pub use crate::error::CheckError;
pub use crate::helper::{extract_number, extract_text};
pub use crate::metric::{MetricGroup, MetricId, MetricKind, MetricValue, Metrics};
pub use crate::report::{Report, StatusLine};
pub use crate::runner::{Runner, RunnerResult};
pub use crate::snmp::{collect, MetricSource, SnmpGet, StaticSource};

/// Represents a service state from nagios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ServiceState::Unknown => 0,
            ServiceState::Ok => 1,
            ServiceState::Warning => 2,
            ServiceState::Critical => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

impl PartialOrd for ServiceState {
    fn partial_cmp(&self, other: &ServiceState) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Unknown sorts below Ok so that folding metric states with `max` never lets a missing state
/// win over a real result.
impl Ord for ServiceState {
    fn cmp(&self, other: &ServiceState) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// The purpose of ToPerfString is only so values can have a performance data representation
/// without going through Display, which the status lines use.
pub trait ToPerfString {
    fn to_perf_string(&self) -> String;
}

// Whole numbers print without a fractional part, so `500.0` becomes `500`.
impl_to_perf_string_on_to_string!(f64, String);

impl<T> ToPerfString for Option<T>
where
    T: ToPerfString,
{
    fn to_perf_string(&self) -> String {
        match self {
            Some(ref s) => s.to_perf_string(),
            None => String::new(),
        }
    }
}

/// Unit of measurement attached to a metric. It's used as suffix both in the status line and in
/// the performance data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    None,
    Percentage,
    Megabytes,
    Gigabytes,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::None => "",
            Unit::Percentage => "%",
            Unit::Megabytes => "MB",
            Unit::Gigabytes => "GB",
        };
        f.write_str(s)
    }
}

/// Alert range of a performance data threshold, in the nagios range syntax.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Threshold {
    /// Alert when the value rises above the level, rendered as `N`.
    Above(f64),
    /// Alert when the value drops below the level, rendered as `N:`.
    Below(f64),
}

impl ToPerfString for Threshold {
    fn to_perf_string(&self) -> String {
        match self {
            Threshold::Above(level) => level.to_perf_string(),
            Threshold::Below(level) => format!("{}:", level.to_perf_string()),
        }
    }
}

/// A single performance data token, `label=value[unit][;warn;crit]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerfData {
    label: String,
    value: f64,
    unit: Unit,
    warning: Option<Threshold>,
    critical: Option<Threshold>,
}

impl PerfData {
    pub fn new(label: &str, value: f64, unit: Unit) -> Self {
        PerfData {
            label: label.to_owned(),
            value,
            unit,
            warning: None,
            critical: None,
        }
    }

    pub fn with_thresholds(mut self, warning: Threshold, critical: Threshold) -> Self {
        self.warning = Some(warning);
        self.critical = Some(critical);
        self
    }

    pub fn warning(&self) -> Option<Threshold> {
        self.warning
    }

    pub fn critical(&self) -> Option<Threshold> {
        self.critical
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl ToPerfString for PerfData {
    fn to_perf_string(&self) -> String {
        // replace `=`
        let label = self.label.replace('=', "_");

        // quote `'`
        let label = label.replace('\'', "''");

        // quote if contains spaces
        let label = if label.contains(' ') {
            format!("'{}'", label)
        } else {
            label
        };

        perf_string!(
            label,
            format!("{}{}", self.value.to_perf_string(), self.unit),
            self.warning,
            self.critical
        )
    }
}
