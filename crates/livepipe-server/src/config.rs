//! Server configuration.

use std::time::Duration;

use livepipe_settings::ServerSettings;

/// Configuration for the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Deadline for one request, including its unit of work.
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
        }
    }

    /// `host:port` for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout: Duration::from_secs(10),
        }
    }
}
