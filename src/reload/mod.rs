//! Hot reload over WebSocket.
//!
//! ```text
//! FsActor -> BuilderActor -> WsActor -> Browser
//!  (watch)     (build)      (broadcast)
//! ```
//!
//! - `message` - JSON messages exchanged with the browser client
//! - `server` - WebSocket acceptor handing clients to the `WsActor`

pub mod message;
pub mod server;
