//! Switch Web UI Client
//!
//! Fetches status pages from GS1920 switches over plain HTTP or HTTPS.
//!
//! # Example
//!
//! ```no_run
//! use gs1920_exporter::config::{DeviceConfig, Scheme};
//! use gs1920_exporter::switch::{SessionStore, SwitchClient};
//! use secrecy::SecretString;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let device = DeviceConfig {
//!     address: "10.0.0.2".to_string(),
//!     schema: Scheme::Http,
//!     user: "admin".to_string(),
//!     password: SecretString::from("1234"),
//!     features: None,
//! };
//!
//! let client = SwitchClient::new(false, Arc::new(SessionStore::new()))?;
//! let page = client.fetch("core-sw1", &device, "/US/1/rpsysinfo.html").await?;
//! # Ok(())
//! # }
//! ```

use crate::config::DeviceConfig;
use crate::error::{ExporterError, Result};
use crate::switch::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Upper bound for a single request when no tighter deadline applies
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for switch status pages
///
/// Holds one connection pool for every switch and the shared session cache.
/// Cloning is cheap and clones share both.
#[derive(Clone)]
pub struct SwitchClient {
    http: reqwest::Client,
    sessions: Arc<SessionStore>,
}

impl SwitchClient {
    /// Build a client; `insecure` disables TLS certificate verification
    pub fn new(insecure: bool, sessions: Arc<SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(1)
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self { http, sessions })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// GET a page from a switch and return its body
    ///
    /// Session cookies in the response are applied before the status code is
    /// checked, so a rejected session is forgotten even on an error page.
    ///
    /// # Errors
    ///
    /// - [`ExporterError::Http`] on transport failures
    /// - [`ExporterError::Status`] when the status is not 2xx
    pub async fn fetch(&self, name: &str, device: &DeviceConfig, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", device.base_url(), path);
        debug!("Fetching {}", url);

        let (request, mode) = self.sessions.authorize(name, device, self.http.get(&url));
        let response = request.send().await?;

        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();
        self.sessions.observe(name, mode, cookies);

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
