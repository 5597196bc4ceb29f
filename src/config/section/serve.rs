//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port number
//! ws_port = 35729             # Hot reload WebSocket port
//! watch = true                # Rebuild on file changes
//! stale = true                # Serve the last good build while rebuilding
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port for reload notifications.
    pub ws_port: u16,

    /// Enable file watcher for live reload.
    pub watch: bool,

    /// Serve the previous output while a rebuild runs.
    /// - `true` (default): never block a request on a build
    /// - `false`: hold requests until the build settles
    pub stale: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            ws_port: 35729,
            watch: true,
            stale: true,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == self.ws_port {
            diag.error(
                FieldPath::new("serve.ws_port"),
                format!("`serve.port` and `serve.ws_port` are both {}", self.port),
            );
        }
    }
}
