// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session construction parameters (§4.1).

use std::time::Duration;

use erpl_types::SapClient;

/// Basic-auth credentials carried alongside a session (§4.1 "sap_client,
/// credentials, base URL").
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Parameters fixed at session construction; none of these change once
/// the session is built.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub sap_client: SapClient,
    pub credentials: Option<Credentials>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Cadence of `PollUntilComplete` GETs (§4.3 default: 1 second).
    pub poll_interval: Duration,
    /// Wall-clock deadline applied when a caller does not override it.
    pub default_poll_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16, use_https: bool, sap_client: SapClient) -> Self {
        Self {
            host: host.into(),
            port,
            use_https,
            sap_client,
            credentials: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            default_poll_timeout: Duration::from_secs(120),
        }
    }

    /// Attach basic-auth credentials sent on every outgoing request.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials { username: username.into(), password: password.into() });
        self
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_reflects_scheme_and_port() {
        let cfg = SessionConfig::new("sap.example.com", 44300, true, SapClient::parse("100").unwrap());
        assert_eq!(cfg.base_url(), "https://sap.example.com:44300");
    }
}
