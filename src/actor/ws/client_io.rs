use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tungstenite::protocol::Message;

use crate::cli::serve::DevServerSession;
use crate::reload::message::HotReloadMessage;

use super::{Clients, WsActor};

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Handshake, greet and register a new client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking for polled reads after
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let connected = HotReloadMessage::connected();
        if ws.send(Message::Text(connected.to_json().into())).is_err() {
            return;
        }

        if let Some(failure) = self.session.last_error() {
            let msg = HotReloadMessage::error(failure.path, failure.message);
            if ws.send(Message::Text(msg.to_json().into())).is_err() {
                return;
            }
            crate::debug!("ws"; "sent pending error to new client");
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        self.session.set_client_count(clients.len());
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Drop clients that closed or errored; incoming text is ignored.
    pub(super) fn client_reader_loop(clients: Clients, session: Arc<DevServerSession>) {
        while !crate::core::is_shutdown() {
            std::thread::sleep(READ_POLL);

            let mut clients = clients.lock();
            let before = clients.len();

            clients.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    true
                }
                Err(_) => false,
            });

            if clients.len() != before {
                session.set_client_count(clients.len());
                crate::debug!("ws"; "client disconnected (total: {})", clients.len());
            }
        }
    }
}
