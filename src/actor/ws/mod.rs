//! WebSocket Actor - client connections and broadcast
//!
//! ```text
//! BuilderActor --[Reload/Error/ClearError]--> WsActor --[broadcast]--> Clients
//! ```
//!
//! Delivery is best-effort: a client whose send fails is dropped silently.
//! The last build error lives in the session, so clients connecting while
//! the build is broken see the overlay right away.

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::cli::serve::DevServerSession;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Shared by the broadcast path and the reader thread
    clients: Clients,
    session: Arc<DevServerSession>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, session: Arc<DevServerSession>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            session,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let session = Arc::clone(&self.session);
        std::thread::spawn(move || Self::client_reader_loop(clients, session));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload_with_reason(reason));
                }
                WsMsg::Error { path, error } => {
                    self.broadcast(&HotReloadMessage::error(path, error));
                }
                WsMsg::ClearError => {
                    self.broadcast(&HotReloadMessage::clear_error());
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut ws in clients.drain(..) {
                        let _ = ws.close(None);
                    }
                    self.session.set_client_count(0);
                    break;
                }
            }
        }
    }
}
