//! Metrics Collectors
//!
//! Each collector knows one status page of the GS1920 web UI: where to fetch
//! it, which metrics it can produce, and how to read them out of the page's
//! tables.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Declare a fixed page path (`fetch_path`) and metric descriptors (`describe`)
//! - Receive the table extracted from that page
//! - Return `MetricSample`s labeled with the target device first
//!
//! # Error Handling
//!
//! Collectors never fail. Rows with an unexpected column count and cells that
//! do not parse as numbers are skipped, so one odd row never costs the whole
//! page. Fetch failures are handled by the prober.

use crate::config::Features;
use crate::switch::{CellMode, Table};

/// Static description of a metric family
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// One value of a metric family, labels in descriptor order
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub desc: &'static MetricDesc,
    pub labels: Vec<String>,
    pub value: f64,
}

impl MetricSample {
    pub fn new(desc: &'static MetricDesc, labels: Vec<String>, value: f64) -> Self {
        Self {
            desc,
            labels,
            value,
        }
    }
}

/// Status of one collector run against one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Page fetched and parsed
    Success,
    /// Fetch failed or timed out (already logged as warning)
    Failed,
}

/// The status pages this exporter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collector {
    /// Fans, temperatures and voltages
    Hwmon,
    /// Power over Ethernet per port
    Poe,
}

impl Collector {
    /// Value of the `collector` label
    pub fn key(self) -> &'static str {
        match self {
            Collector::Hwmon => "hwmon",
            Collector::Poe => "poe",
        }
    }

    pub fn fetch_path(self) -> &'static str {
        match self {
            Collector::Hwmon => hwmon::PAGE,
            Collector::Poe => poe::PAGE,
        }
    }

    pub fn describe(self) -> &'static [&'static MetricDesc] {
        match self {
            Collector::Hwmon => &hwmon::DESCRIPTORS,
            Collector::Poe => &poe::DESCRIPTORS,
        }
    }

    /// Cell rule the page markup needs
    pub fn cell_mode(self) -> CellMode {
        match self {
            Collector::Hwmon => CellMode::Cell,
            Collector::Poe => CellMode::Nested,
        }
    }

    pub fn collect(self, table: &Table, target: &str) -> Vec<MetricSample> {
        match self {
            Collector::Hwmon => hwmon::collect(table, target),
            Collector::Poe => poe::collect(table, target),
        }
    }
}

/// Numeric value of a cell. Out-of-range readings such as `1e400` count as
/// unparseable rather than infinite.
fn parse_reading(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Collectors enabled by a feature set, in a fixed order
pub fn for_features(features: Features) -> Vec<Collector> {
    let mut collectors = Vec::with_capacity(2);
    if features.hwmon {
        collectors.push(Collector::Hwmon);
    }
    if features.poe {
        collectors.push(Collector::Poe);
    }
    collectors
}

// Collector modules
pub mod hwmon;
pub mod poe;
