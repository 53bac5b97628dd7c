#![allow(dead_code)]

//! Fake GS1920 switch for integration tests
//!
//! Serves the hardware monitor and PoE pages from an axum server bound to an
//! ephemeral localhost port, records the credentials of every request and can
//! be told to set session cookies, fail, or stall.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use gs1920_exporter::config::{Config, DeviceConfig, Features, Scheme, ServerConfig};
use secrecy::SecretString;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SENSOR_PAGE: &str = r#"<html>
<head><title>System Info</title></head>
<body>
<table>
  <tr><th>Sensor</th><th>Current</th><th>MAX</th><th>MIN</th><th>Threshold</th><th>Status</th></tr>
  <tr><td>BOARD</td><td> 41.5 </td><td>52.0</td><td>30.0</td><td>95</td><td>Normal</td></tr>
  <tr><td>MAC</td><td>47</td><td>55</td><td>33</td><td>95</td><td>Normal</td></tr>
  <tr><td>FAN1</td><td>4821</td><td>5000</td><td>4000</td><td>2000</td><td>Normal</td></tr>
  <tr><td>FAN2</td><td>N/A</td><td>-</td><td>-</td><td>-</td><td>Normal</td></tr>
  <tr><td>3.3V</td><td>3.31</td><td>3.35</td><td>3.28</td><td>+/-10%</td><td>Normal</td></tr>
  <tr><td>1.2V</td><td>1.41</td><td>1.41</td><td>1.19</td><td>+/-10%</td><td>Error</td></tr>
  <tr><td>System Name</td><td>core-sw1</td></tr>
  <tr><td>Uptime</td><td>12</td><td>-</td><td>-</td><td>-</td><td>Normal</td></tr>
</table>
</body>
</html>"#;

/// One 35-column PoE port row
///
/// The port index and the power cells are wrapped in a `<div>`, the way the
/// switch renders them. No whitespace is emitted between cells.
pub fn poe_row(port: &str, state: &str, consuming: &str, max: &str) -> String {
    let mut cells: Vec<String> = (0..35).map(|i| format!("c{}", i)).collect();
    cells[2] = port.to_string();
    cells[6] = state.to_string();
    cells[22] = consuming.to_string();
    cells[26] = max.to_string();

    let mut row = String::from("<tr>");
    for (i, cell) in cells.iter().enumerate() {
        if matches!(i, 2 | 22 | 26) {
            row.push_str(&format!("<td><div>{}</div></td>", cell));
        } else {
            row.push_str(&format!("<td>{}</td>", cell));
        }
    }
    row.push_str("</tr>");
    row
}

/// The same row with a line break after every cell, as hand-formatted
/// markup has it
pub fn poe_row_multiline(port: &str, state: &str, consuming: &str, max: &str) -> String {
    poe_row(port, state, consuming, max)
        .replace("</td>", "</td>\n")
        .replace("<tr>", "<tr>\n")
}

pub fn poe_page(rows: &[String]) -> String {
    format!(
        "<html><head><title>PoE Status</title></head><body><table>\
         <tr><th>Port</th><th>State</th></tr>{}</table></body></html>",
        rows.concat()
    )
}

pub fn default_poe_page() -> String {
    poe_page(&[
        poe_row("1", "Enable", "3200", "4100"),
        poe_row("2", "Enable", "0", "N/A"),
        poe_row("3", "Disable", "100", "200"),
    ])
}

/// Credentials seen on one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeenAuth {
    Basic,
    Cookie(String),
    None,
}

pub struct SwitchState {
    pub requests: AtomicUsize,
    pub seen: Mutex<Vec<(String, SeenAuth)>>,
    /// Value of the C1 cookie to set on every response, if any
    pub set_cookie: Mutex<Option<String>>,
    pub hwmon_status: Mutex<StatusCode>,
    pub poe_delay: Mutex<Duration>,
    pub poe_page: Mutex<String>,
}

pub struct FakeSwitch {
    pub addr: SocketAddr,
    pub state: Arc<SwitchState>,
}

impl FakeSwitch {
    pub async fn start() -> FakeSwitch {
        let state = Arc::new(SwitchState {
            requests: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            set_cookie: Mutex::new(None),
            hwmon_status: Mutex::new(StatusCode::OK),
            poe_delay: Mutex::new(Duration::ZERO),
            poe_page: Mutex::new(default_poe_page()),
        });

        let app = Router::new()
            .route("/US/1/rpsysinfo.html", get(sensor_handler))
            .route("/US/1/rppoestatus.html", get(poe_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake switch");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeSwitch { addr, state }
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, SeenAuth)> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn set_cookie(&self, value: Option<&str>) {
        *self.state.set_cookie.lock().unwrap() = value.map(str::to_string);
    }

    pub fn set_hwmon_status(&self, status: StatusCode) {
        *self.state.hwmon_status.lock().unwrap() = status;
    }

    pub fn set_poe_page(&self, page: String) {
        *self.state.poe_page.lock().unwrap() = page;
    }

    pub fn set_poe_delay(&self, delay: Duration) {
        *self.state.poe_delay.lock().unwrap() = delay;
    }

    pub fn device(&self) -> DeviceConfig {
        DeviceConfig {
            address: self.addr.to_string(),
            schema: Scheme::Http,
            user: "admin".to_string(),
            password: SecretString::from("1234"),
            features: None,
        }
    }

    /// Exporter config with this switch registered as `sw1`
    pub fn config(&self, features: Features) -> Config {
        let mut devices = HashMap::new();
        devices.insert("sw1".to_string(), self.device());
        Config {
            server: ServerConfig::default(),
            devices,
            features,
        }
    }
}

fn record(state: &SwitchState, page: &str, headers: &HeaderMap) {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let auth = if let Some(cookie) = headers.get(header::COOKIE) {
        SeenAuth::Cookie(cookie.to_str().unwrap_or_default().to_string())
    } else if headers.contains_key(header::AUTHORIZATION) {
        SeenAuth::Basic
    } else {
        SeenAuth::None
    };
    state.seen.lock().unwrap().push((page.to_string(), auth));
}

fn respond(state: &SwitchState, status: StatusCode, body: String) -> Response {
    let cookie = state.set_cookie.lock().unwrap().clone();
    let mut response = (status, axum::response::Html(body)).into_response();
    if let Some(value) = cookie {
        response.headers_mut().insert(
            header::SET_COOKIE,
            format!("C1={}; path=/", value).parse().unwrap(),
        );
    }
    response
}

async fn sensor_handler(State(state): State<Arc<SwitchState>>, headers: HeaderMap) -> Response {
    record(&state, "hwmon", &headers);
    let status = *state.hwmon_status.lock().unwrap();
    respond(&state, status, SENSOR_PAGE.to_string())
}

async fn poe_handler(State(state): State<Arc<SwitchState>>, headers: HeaderMap) -> Response {
    record(&state, "poe", &headers);
    let delay = *state.poe_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let page = state.poe_page.lock().unwrap().clone();
    respond(&state, StatusCode::OK, page)
}
