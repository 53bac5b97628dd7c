//! Zyxel GS1920 Prometheus Exporter
//!
//! A multi-target Prometheus exporter for Zyxel GS1920 switches, which expose
//! their hardware and PoE status only as HTML pages in the web UI.
//!
//! # Overview
//!
//! Prometheus calls `/probe?target=<device>` for every configured switch. The
//! exporter fetches the relevant status pages from that switch, flattens their
//! HTML tables into rows, and turns known rows into metrics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   HTTP (basic auth   ┌──────────────┐
//! │   GS1920    │    or C1 cookie)     │   Exporter   │
//! │   switch    │ ◄─────────────────►  │              │
//! └─────────────┘   HTML status pages  │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │ Switch │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │ /probe?target= └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Collect │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`switch`] - HTTP client, session cache and HTML table extraction
//! - [`collectors`] - Page-specific metric collectors (hardware monitor, PoE)
//! - [`probe`] - Per-device probe orchestration and deadlines
//! - [`metrics`] - Prometheus registries and metric definitions
//! - [`server`] - HTTP server and endpoints
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use gs1920_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.yml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod server;
pub mod switch;
