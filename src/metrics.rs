//! Prometheus Metrics Definitions
//!
//! Two registries exist:
//!
//! - [`ProbeMetrics`]: built fresh for every `/probe` request. It registers the
//!   probe-wide metrics plus the descriptors of the collectors bound to the
//!   device, receives the samples of one probe and renders them.
//! - [`ExporterMetrics`]: process-wide, served on `/metrics`. Describes the
//!   exporter itself (build info and probe counts).
//!
//! # Probe Metrics
//!
//! - `zyxel_up` - 1 when every collector succeeded
//! - `zyxel_collector_duration_seconds` - Duration of the whole probe
//! - `zyxel_collect_duration_seconds` - Duration per collector
//!
//! Collector metrics are listed in the `collectors` modules.

use crate::collectors::{Collector, MetricDesc, MetricSample};
use crate::probe::ProbeOutcome;
use prometheus::{Encoder, GaugeVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub static UP: MetricDesc = MetricDesc {
    name: "zyxel_up",
    help: "Scrape of target was successful",
    labels: &["target"],
};

pub static PROBE_DURATION: MetricDesc = MetricDesc {
    name: "zyxel_collector_duration_seconds",
    help: "Duration of a collector scrape for one target",
    labels: &["target"],
};

pub static COLLECTOR_DURATION: MetricDesc = MetricDesc {
    name: "zyxel_collect_duration_seconds",
    help: "Duration of a scrape by collector and target",
    labels: &["target", "collector"],
};

/// Metrics of a single probe
pub struct ProbeMetrics {
    registry: Registry,
    gauges: HashMap<&'static str, GaugeVec>,
}

impl ProbeMetrics {
    /// Register the probe-wide metrics and everything `collectors` describe
    pub fn new(collectors: &[Collector]) -> anyhow::Result<Self> {
        let mut metrics = Self {
            registry: Registry::new(),
            gauges: HashMap::new(),
        };

        for desc in [&UP, &PROBE_DURATION, &COLLECTOR_DURATION] {
            metrics.register(desc)?;
        }
        for collector in collectors {
            for desc in collector.describe() {
                metrics.register(*desc)?;
            }
        }

        Ok(metrics)
    }

    fn register(&mut self, desc: &'static MetricDesc) -> anyhow::Result<()> {
        if self.gauges.contains_key(desc.name) {
            return Ok(());
        }

        let gauge = GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)?;
        self.registry.register(Box::new(gauge.clone()))?;
        self.gauges.insert(desc.name, gauge);
        Ok(())
    }

    /// Push one sample into its metric family
    ///
    /// Samples of unregistered families or with a wrong label count are
    /// dropped with a warning.
    pub fn emit(&self, sample: &MetricSample) {
        let Some(gauge) = self.gauges.get(sample.desc.name) else {
            warn!("Dropping sample of unregistered metric {}", sample.desc.name);
            return;
        };

        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        match gauge.get_metric_with_label_values(labels.as_slice()) {
            Ok(metric) => metric.set(sample.value),
            Err(e) => warn!("Dropping sample of {}: {}", sample.desc.name, e),
        }
    }

    /// Emit collector samples, per-collector durations, probe duration and up
    pub fn record(&self, outcome: &ProbeOutcome) {
        for sample in &outcome.samples {
            self.emit(sample);
        }

        let target = outcome.target.clone();
        for result in &outcome.results {
            self.emit(&MetricSample::new(
                &COLLECTOR_DURATION,
                vec![target.clone(), result.collector.key().to_string()],
                result.duration.as_secs_f64(),
            ));
        }

        self.emit(&MetricSample::new(
            &PROBE_DURATION,
            vec![target.clone()],
            outcome.duration.as_secs_f64(),
        ));
        self.emit(&MetricSample::new(
            &UP,
            vec![target],
            if outcome.up { 1.0 } else { 0.0 },
        ));
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        render(&self.registry)
    }
}

/// Metrics about the exporter process itself
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Arc<Registry>,
    pub build_info: Arc<IntGaugeVec>,
    pub probes_total: Arc<IntCounterVec>,
}

impl ExporterMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let build_info = IntGaugeVec::new(
            Opts::new("build_info", "Build information of the exporter (value is always 1)")
                .namespace("zyxel_exporter"),
            &["version"],
        )?;

        let probes_total = IntCounterVec::new(
            Opts::new("probes_total", "Probe requests handled, by result")
                .namespace("zyxel_exporter"),
            &["result"],
        )?;

        registry.register(Box::new(build_info.clone()))?;
        registry.register(Box::new(probes_total.clone()))?;

        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);

        Ok(Self {
            registry: Arc::new(registry),
            build_info: Arc::new(build_info),
            probes_total: Arc::new(probes_total),
        })
    }

    /// Count a handled probe; `result` is `success`, `failure` or `rejected`
    pub fn count_probe(&self, result: &str) {
        self.probes_total.with_label_values(&[result]).inc();
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        render(&self.registry)
    }
}

fn render(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
