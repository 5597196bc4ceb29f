use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::builder::BuilderActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;
use crate::cli::serve::DevServerSession;

/// Grace period for actors to finish after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub(super) struct Actors {
    pub(super) fs: Option<FsActor>,
    pub(super) builder: BuilderActor,
    pub(super) ws: WsActor,
}

/// Run all actors until the shutdown signal or a watcher failure.
pub(super) async fn run_actors(
    actors: Actors,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
    session: &Arc<DevServerSession>,
) -> Result<()> {
    let builder_handle = tokio::spawn(actors.builder.run());
    let ws_handle = tokio::spawn(actors.ws.run());
    let fs_handle = actors.fs.map(|fs| tokio::spawn(fs.run()));

    let watcher = async {
        match fs_handle {
            Some(handle) => handle.await,
            None => std::future::pending().await,
        }
    };

    let mut result = Ok(());
    tokio::select! {
        _ = shutdown_signal(shutdown_rx) => {
            crate::debug!("actor"; "shutdown signal received");
        }
        exit = watcher => {
            if let Ok(Err(e)) = exit {
                crate::log!("watch"; "{}", e);
                crate::core::request_shutdown();
                result = Err(e);
            }
        }
    }

    session.stop();
    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;

    let _ = tokio::time::timeout(SHUTDOWN_GRACE, builder_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;

    result
}

/// Resolves once the Ctrl+C handler fires. Never resolves without a receiver.
async fn shutdown_signal(rx: Option<Receiver<()>>) {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };
    while rx.try_recv().is_err() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
