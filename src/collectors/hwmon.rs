//! Hardware Monitor Collector
//!
//! Reads the sensor table of the system information page.
//!
//! # Metrics Produced
//! - `zyxel_hwmon_sensor_value` - Current sensor reading (RPM, degrees, volts)
//!   - Labels: target, sensor
//! - `zyxel_hwmon_sensor_status` - Sensor status (0=Normal, 1=anything else)
//!   - Labels: target, sensor
//!
//! # Row Shape
//!
//! A sensor row has exactly six cells. The first names the sensor (`FAN1`,
//! `BOARD`, `MAC`, `PHY`, or a rail such as `3.3V`), the second holds the
//! reading and the sixth the status text.

use super::{parse_reading, MetricDesc, MetricSample};
use crate::switch::Table;
use regex::Regex;
use std::sync::LazyLock;

pub const PAGE: &str = "/US/1/rpsysinfo.html";

const SENSOR_COLUMNS: usize = 6;
const STATUS_NORMAL: &str = "Normal";

pub static SENSOR_VALUE: MetricDesc = MetricDesc {
    name: "zyxel_hwmon_sensor_value",
    help: "Current sensor value",
    labels: &["target", "sensor"],
};

pub static SENSOR_STATUS: MetricDesc = MetricDesc {
    name: "zyxel_hwmon_sensor_status",
    help: "Current sensor status",
    labels: &["target", "sensor"],
};

pub static DESCRIPTORS: [&MetricDesc; 2] = [&SENSOR_VALUE, &SENSOR_STATUS];

static FAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^FAN[0-9]$").expect("valid regex"));
static TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(BOARD|MAC|PHY)$").expect("valid regex"));
static VOLTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.?[0-9]+?V$").expect("valid regex"));

/// Whether a first cell names a fan, temperature zone or voltage rail
pub fn is_sensor(name: &str) -> bool {
    VOLTAGE.is_match(name) || FAN.is_match(name) || TEMPERATURE.is_match(name)
}

/// Collects sensor readings and statuses from the system information table
///
/// The status sample is emitted for every sensor row, even when the reading
/// is not a number (e.g. `N/A` for a stopped fan).
pub fn collect(table: &Table, target: &str) -> Vec<MetricSample> {
    let mut samples = Vec::new();

    for row in table {
        if row.len() != SENSOR_COLUMNS || !is_sensor(&row[0]) {
            continue;
        }

        let labels = vec![target.to_string(), row[0].clone()];

        if let Some(value) = parse_reading(&row[1]) {
            samples.push(MetricSample::new(&SENSOR_VALUE, labels.clone(), value));
        }

        let status = if row[5] == STATUS_NORMAL { 0.0 } else { 1.0 };
        samples.push(MetricSample::new(&SENSOR_STATUS, labels, status));
    }

    samples
}
