//! Device Probing
//!
//! One probe scrapes one switch: every bound collector is run once, in order,
//! against the same device. A collector whose page cannot be fetched in time
//! fails on its own and the remaining collectors still run.
//!
//! # Outcome
//!
//! - `up` is true only when every collector succeeded
//! - `duration` is the wall time of the whole probe
//! - each `CollectorResult` carries its own duration for the
//!   `zyxel_collect_duration_seconds` metric

use crate::collectors::{CollectionStatus, Collector, MetricSample};
use crate::config::{Config, DeviceConfig};
use crate::error::{ExporterError, Result};
use crate::switch::{table, SwitchClient};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Header Prometheus uses to announce its scrape timeout
pub const TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

/// Scrape timeout assumed when Prometheus does not send one
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 120.0;

/// Shared context for one device probe
#[derive(Clone, Copy)]
pub struct ProbeContext<'a> {
    pub client: &'a SwitchClient,
    /// Device name from the configuration, used as the `target` label
    pub target: &'a str,
    pub device: &'a DeviceConfig,
}

#[derive(Debug, Clone)]
pub struct CollectorResult {
    pub collector: Collector,
    pub status: CollectionStatus,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub target: String,
    pub up: bool,
    pub duration: Duration,
    pub results: Vec<CollectorResult>,
    pub samples: Vec<MetricSample>,
}

/// Look up the device named by the `target` query parameter
pub fn resolve_target<'a>(
    config: &'a Config,
    target: Option<&str>,
) -> Result<(&'a str, &'a DeviceConfig)> {
    let target = match target {
        Some(target) if !target.is_empty() => target,
        _ => return Err(ExporterError::MissingTarget),
    };

    config
        .devices
        .get_key_value(target)
        .map(|(name, device)| (name.as_str(), device))
        .ok_or_else(|| ExporterError::UnknownTarget(target.to_string()))
}

/// Time budget for a probe
///
/// Uses the scrape timeout announced by Prometheus (or 120s when absent or
/// zero) minus `offset`, so the exporter answers before Prometheus gives up.
pub fn scrape_timeout(header: Option<&str>, offset: f64) -> Result<Duration> {
    let mut seconds = match header.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<f64>()
            .map_err(|e| ExporterError::InvalidTimeoutHeader(format!("{}: {}", value, e)))?,
        None => 0.0,
    };

    if !seconds.is_finite() {
        return Err(ExporterError::InvalidTimeoutHeader(format!(
            "{} is not a finite number of seconds",
            seconds
        )));
    }

    if seconds == 0.0 {
        seconds = DEFAULT_TIMEOUT_SECONDS;
    }

    Ok(Duration::from_secs_f64((seconds - offset).max(0.0)))
}

/// Runs every collector against one device before `deadline`
pub async fn probe_device(
    ctx: &ProbeContext<'_>,
    collectors: &[Collector],
    deadline: Instant,
) -> ProbeOutcome {
    let started = Instant::now();
    let mut results = Vec::with_capacity(collectors.len());
    let mut samples = Vec::new();

    for &collector in collectors {
        let collector_started = Instant::now();

        let status = match run_collector(ctx, collector, deadline).await {
            Ok(mut collected) => {
                debug!(
                    "{}: {} collected {} samples",
                    ctx.target,
                    collector.key(),
                    collected.len()
                );
                samples.append(&mut collected);
                CollectionStatus::Success
            }
            Err(e) => {
                warn!("{}: {} failed: {}", ctx.target, collector.key(), e);
                CollectionStatus::Failed
            }
        };

        results.push(CollectorResult {
            collector,
            status,
            duration: collector_started.elapsed(),
        });
    }

    let up = results
        .iter()
        .all(|result| result.status == CollectionStatus::Success);

    ProbeOutcome {
        target: ctx.target.to_string(),
        up,
        duration: started.elapsed(),
        results,
        samples,
    }
}

async fn run_collector(
    ctx: &ProbeContext<'_>,
    collector: Collector,
    deadline: Instant,
) -> Result<Vec<MetricSample>> {
    let path = collector.fetch_path();
    let body = tokio::time::timeout_at(deadline, ctx.client.fetch(ctx.target, ctx.device, path))
        .await
        .map_err(|_| ExporterError::DeadlineExceeded(path.to_string()))??;

    let rows = table::extract(&body, collector.cell_mode());
    Ok(collector.collect(&rows, ctx.target))
}
