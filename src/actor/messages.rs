//! Actor message definitions.
//!
//! ```text
//! FsActor --Rebuild--> BuilderActor --Reload/Error--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

/// Messages to the `BuilderActor`
#[derive(Debug)]
pub enum BuildMsg {
    /// Rebuild the whole output.
    Rebuild {
        /// Changed files since the last message, empty for the initial build
        changed: Vec<PathBuf>,
        /// `pagepack.toml` itself changed
        config_changed: bool,
    },
    Shutdown,
}

impl BuildMsg {
    /// The build every `serve` run starts with.
    pub fn initial() -> Self {
        Self::Rebuild {
            changed: Vec::new(),
            config_changed: false,
        }
    }
}

/// Messages to the `WsActor`
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every client
    Reload { reason: String },
    /// Build error (display overlay, no reload)
    Error { path: String, error: String },
    /// Clear error overlay (build succeeded after error)
    ClearError,
    /// New TCP connection, handshake pending
    AddClient(TcpStream),
    Shutdown,
}
