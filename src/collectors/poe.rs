//! Power over Ethernet Collector
//!
//! Reads the per-port table of the PoE status page.
//!
//! # Metrics Produced
//! - `zyxel_poe_power_consuming` - Power drawn by the port (mW)
//!   - Labels: target, ifIndex
//! - `zyxel_poe_power_max` - Maximum power seen on the port (mW)
//!   - Labels: target, ifIndex

use super::{parse_reading, MetricDesc, MetricSample};
use crate::switch::Table;

pub const PAGE: &str = "/US/1/rppoestatus.html";

const PORT_COLUMNS: usize = 35;
const PORT_INDEX: usize = 2;
const PORT_STATE: usize = 6;
const POWER_CONSUMING: usize = 22;
const POWER_MAX: usize = 26;
const STATE_DISABLED: &str = "Disable";

pub static POWER_CONSUMING_DESC: MetricDesc = MetricDesc {
    name: "zyxel_poe_power_consuming",
    help: "Consuming Power (mW)",
    labels: &["target", "ifIndex"],
};

pub static POWER_MAX_DESC: MetricDesc = MetricDesc {
    name: "zyxel_poe_power_max",
    help: "Max Power (mW)",
    labels: &["target", "ifIndex"],
};

pub static DESCRIPTORS: [&MetricDesc; 2] = [&POWER_CONSUMING_DESC, &POWER_MAX_DESC];

/// Collects consuming and maximum power for every enabled PoE port
///
/// The port index is kept as text. Each power cell is read on its own: a
/// port with a garbled max column still reports its consumption.
pub fn collect(table: &Table, target: &str) -> Vec<MetricSample> {
    let mut samples = Vec::new();

    for row in table {
        if row.len() != PORT_COLUMNS || row[PORT_STATE] == STATE_DISABLED {
            continue;
        }

        let port = &row[PORT_INDEX];
        let readings = [
            (&POWER_CONSUMING_DESC, &row[POWER_CONSUMING]),
            (&POWER_MAX_DESC, &row[POWER_MAX]),
        ];

        for (desc, cell) in readings {
            if let Some(value) = parse_reading(cell) {
                samples.push(MetricSample::new(
                    desc,
                    vec![target.to_string(), port.clone()],
                    value,
                ));
            }
        }
    }

    samples
}
