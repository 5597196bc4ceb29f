//! Actor Coordinator - wires up the dev server's actors
//!
//! Creates the channels, binds the WebSocket server, starts the watcher,
//! queues the initial build and runs everything until shutdown.

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::builder::BuilderActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::cli::serve::DevServerSession;
use crate::config::PipelineConfig;

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    config: Arc<PipelineConfig>,
    session: Arc<DevServerSession>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<PipelineConfig>, session: Arc<DevServerSession>) -> Self {
        Self {
            config,
            session,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    ///
    /// Without `serve.watch` only the builder runs: one build, no reloads.
    pub async fn run(mut self) -> Result<()> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);
        let serve = &self.config.serve;

        let fs_actor = if serve.watch {
            match crate::reload::server::start_ws_server_with_channel(
                serve.interface,
                serve.ws_port,
                ws_tx.clone(),
            ) {
                Ok(port) => {
                    if port != serve.ws_port {
                        crate::log!("reload"; "port {} in use, using {} instead", serve.ws_port, port);
                    }
                    self.session.set_ws_port(port);
                }
                Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
            }

            let paths = watch_paths::collect_watch_paths(&self.config);
            match FsActor::new(
                paths,
                build_tx.clone(),
                Arc::clone(&self.config),
                Arc::clone(&self.session),
            ) {
                Ok(actor) => Some(actor),
                Err(e) => {
                    self.session.stop();
                    crate::core::request_shutdown();
                    return Err(anyhow::anyhow!("watcher failed: {}", e));
                }
            }
        } else {
            None
        };

        let builder = BuilderActor::new(
            build_rx,
            ws_tx.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.config),
        );
        let ws_actor = WsActor::new(ws_rx, Arc::clone(&self.session));

        build_tx.send(BuildMsg::initial()).await?;

        crate::debug!("actor"; "start");
        let result = runtime::run_actors(
            runtime::Actors {
                fs: fs_actor,
                builder,
                ws: ws_actor,
            },
            build_tx,
            ws_tx,
            self.shutdown_rx.take(),
            &self.session,
        )
        .await;
        crate::debug!("actor"; "stopped");
        result
    }
}
