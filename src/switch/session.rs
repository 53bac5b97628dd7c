//! Per-device Session Cache
//!
//! The switch web UI hands out a session cookie named `C1` after a successful
//! basic-auth request. Reusing that cookie avoids a basic-auth round trip on
//! every page. When the switch no longer accepts a cookie it answers with the
//! same cookie name carrying the value `youshallnotpass`.
//!
//! # States
//!
//! - `Unauthenticated`: no cookie cached, the next request uses basic auth
//! - `Authenticated`: cookie cached, the next request sends it
//!
//! The store is owned by the server state and shared by all probes. Each
//! read/decide/write happens under one short lock, so concurrent probes of
//! the same switch resolve as last-write-wins.

use crate::config::DeviceConfig;
use reqwest::header::COOKIE;
use reqwest::RequestBuilder;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Name of the session cookie set by the switch
pub const SESSION_COOKIE: &str = "C1";

/// Cookie value the switch uses to reject a stale session
pub const REJECTED_SESSION: &str = "youshallnotpass";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(String),
}

/// How a request was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Basic,
    Session,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, device: &str) -> SessionState {
        match self.lock().get(device) {
            Some(cookie) => SessionState::Authenticated(cookie.clone()),
            None => SessionState::Unauthenticated,
        }
    }

    /// Attach the cached cookie, or basic credentials when there is none
    pub fn authorize(
        &self,
        name: &str,
        device: &DeviceConfig,
        request: RequestBuilder,
    ) -> (RequestBuilder, AuthMode) {
        match self.state(name) {
            SessionState::Authenticated(cookie) => (
                request.header(COOKIE, format!("{}={}", SESSION_COOKIE, cookie)),
                AuthMode::Session,
            ),
            SessionState::Unauthenticated => {
                debug!("Using basic auth for {}", name);
                (
                    request.basic_auth(&device.user, Some(device.password.expose_secret())),
                    AuthMode::Basic,
                )
            }
        }
    }

    /// Update the cache from the cookies of a response
    ///
    /// `mode` is how the request that produced the response was authenticated.
    /// The rejection sentinel only discards the cache when a cookie was sent;
    /// any other `C1` value replaces the cached one.
    pub fn observe<I, S>(&self, name: &str, mode: AuthMode, cookies: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        for (cookie_name, value) in cookies {
            if cookie_name.as_ref() != SESSION_COOKIE {
                continue;
            }

            let value = value.as_ref();
            let mut sessions = self.lock();
            if value == REJECTED_SESSION && mode == AuthMode::Session {
                sessions.remove(name);
                debug!("Session for {} rejected, falling back to basic auth", name);
            } else {
                sessions.insert(name.to_string(), value.to_string());
                debug!("Saved session cookie for {}", name);
            }
        }
    }
}
