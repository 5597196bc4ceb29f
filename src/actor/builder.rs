//! Builder Actor - single-flight rebuilds
//!
//! Every change message queued while a build runs is drained and merged
//! before the next build starts, so a burst of edits during a slow build
//! costs exactly one follow-up build.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::cli::serve::{DevServerSession, RebuildOutcome};
use crate::config::{PipelineConfig, cfg, reload_config};
use crate::logger::{status_error, status_success};
use crate::{debug, log};

/// Changes merged from one or more `BuildMsg::Rebuild`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Batch {
    changed: Vec<PathBuf>,
    config_changed: bool,
}

impl Batch {
    fn merge(&mut self, changed: Vec<PathBuf>, config_changed: bool) {
        for path in changed {
            if !self.changed.contains(&path) {
                self.changed.push(path);
            }
        }
        self.config_changed |= config_changed;
    }
}

pub struct BuilderActor {
    rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    session: Arc<DevServerSession>,
    config: Arc<PipelineConfig>,
}

impl BuilderActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        session: Arc<DevServerSession>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            rx,
            ws_tx,
            session,
            config,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(first) = self.rx.recv().await {
            let Some(batch) = self.drain(first) else {
                debug!("build"; "shutting down");
                break;
            };
            if !self.on_rebuild(batch).await {
                break;
            }
        }
    }

    /// Merge `first` with everything already queued. `None` on shutdown.
    fn drain(&mut self, first: BuildMsg) -> Option<Batch> {
        let mut batch = Batch::default();
        let mut next = Some(first);

        while let Some(msg) = next {
            match msg {
                BuildMsg::Rebuild {
                    changed,
                    config_changed,
                } => batch.merge(changed, config_changed),
                BuildMsg::Shutdown => return None,
            }
            next = self.rx.try_recv().ok();
        }
        Some(batch)
    }

    /// Returns `false` when the actor should stop.
    async fn on_rebuild(&mut self, batch: Batch) -> bool {
        if batch.config_changed {
            match reload_config() {
                Ok(true) => {
                    self.config = cfg();
                    log!("config"; "reloaded");
                }
                Ok(false) => {}
                Err(e) => {
                    let detail = format!("{e:#}");
                    status_error("config reload failed", &detail);
                    let _ = self
                        .ws_tx
                        .send(WsMsg::Error {
                            path: self.config_file(),
                            error: detail,
                        })
                        .await;
                    return true;
                }
            }
        }

        let session = Arc::clone(&self.session);
        let config = Arc::clone(&self.config);
        let outcome = tokio::task::spawn_blocking(move || session.rebuild(&config)).await;

        match outcome {
            Ok(RebuildOutcome::Built { output, elapsed }) => {
                status_success(&format!(
                    "built {} files in {:.0?}",
                    output.len(),
                    elapsed
                ));
                debug!("build"; "reloading {} clients", self.session.client_count());
                let _ = self.ws_tx.send(WsMsg::ClearError).await;
                let _ = self
                    .ws_tx
                    .send(WsMsg::Reload {
                        reason: self.reason(&batch),
                    })
                    .await;
                true
            }
            Ok(RebuildOutcome::Failed(failure)) => {
                status_error("build failed", &failure.to_string());
                let _ = self
                    .ws_tx
                    .send(WsMsg::Error {
                        path: failure.path,
                        error: failure.message,
                    })
                    .await;
                true
            }
            Ok(RebuildOutcome::Skipped) => false,
            Err(e) => {
                log!("error"; "build task failed: {}", e);
                self.session.stop();
                crate::core::request_shutdown();
                false
            }
        }
    }

    fn config_file(&self) -> String {
        self.config
            .root_relative(&self.config.config_path)
            .display()
            .to_string()
    }

    fn reason(&self, batch: &Batch) -> String {
        match batch.changed.as_slice() {
            [] => "initial build".to_string(),
            [one] => self.config.root_relative(one).display().to_string(),
            [first, rest @ ..] => format!(
                "{} (+{} more)",
                self.config.root_relative(first).display(),
                rest.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::serve::ServerState;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::create_dir_all(src.join("scss")).unwrap();
        fs::write(src.join("index.html"), "<html><body class=\"btn\"></body></html>").unwrap();
        fs::write(src.join("js/main.js"), "import '../scss/main.scss';\n").unwrap();
        fs::write(src.join("scss/main.scss"), ".btn { color: red; }\n").unwrap();
        dir
    }

    fn rebuild(path: &std::path::Path) -> BuildMsg {
        BuildMsg::Rebuild {
            changed: vec![path.to_path_buf()],
            config_changed: false,
        }
    }

    #[test]
    fn test_batch_merge_dedups() {
        let mut batch = Batch::default();
        batch.merge(vec![PathBuf::from("a"), PathBuf::from("b")], false);
        batch.merge(vec![PathBuf::from("a")], true);
        assert_eq!(batch.changed, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert!(batch.config_changed);
    }

    #[tokio::test]
    async fn test_queued_changes_coalesce() {
        let dir = site();
        let config = Arc::new(PipelineConfig::for_root(dir.path()));
        let session = Arc::new(DevServerSession::new(true));
        let (tx, rx) = mpsc::channel(16);
        let (ws_tx, mut ws_rx) = mpsc::channel(16);

        let scss = config.root.join("src/scss/main.scss");
        let js = config.root.join("src/js/main.js");
        tx.send(BuildMsg::initial()).await.unwrap();
        tx.send(rebuild(&scss)).await.unwrap();
        tx.send(rebuild(&js)).await.unwrap();
        drop(tx);

        BuilderActor::new(rx, ws_tx, Arc::clone(&session), Arc::clone(&config))
            .run()
            .await;

        // One build for all three messages: ClearError + Reload
        assert!(matches!(ws_rx.recv().await, Some(WsMsg::ClearError)));
        match ws_rx.recv().await {
            Some(WsMsg::Reload { reason }) => {
                assert_eq!(reason, "src/scss/main.scss (+1 more)");
            }
            other => panic!("expected reload, got {other:?}"),
        }
        assert!(ws_rx.recv().await.is_none());
        assert_eq!(session.state(), ServerState::Serving);
    }

    #[tokio::test]
    async fn test_style_error_reported_and_last_output_kept() {
        let dir = site();
        let config = Arc::new(PipelineConfig::for_root(dir.path()));
        let session = Arc::new(DevServerSession::new(true));
        let (tx, rx) = mpsc::channel(16);
        let (ws_tx, mut ws_rx) = mpsc::channel(16);
        let actor = tokio::spawn(BuilderActor::new(rx, ws_tx, Arc::clone(&session), config).run());

        tx.send(BuildMsg::initial()).await.unwrap();
        assert!(matches!(ws_rx.recv().await, Some(WsMsg::ClearError)));
        assert!(matches!(ws_rx.recv().await, Some(WsMsg::Reload { .. })));
        let good = session.last_output().unwrap();

        let scss = dir.path().join("src/scss/main.scss");
        fs::write(&scss, ".btn { color: red;\n").unwrap();
        tx.send(rebuild(&scss)).await.unwrap();

        match ws_rx.recv().await {
            Some(WsMsg::Error { path, error }) => {
                assert!(path.ends_with("main.scss"), "{path}");
                assert!(!error.is_empty());
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(session.state(), ServerState::Serving);
        assert!(Arc::ptr_eq(&session.output_for_request().unwrap(), &good));

        tx.send(BuildMsg::Shutdown).await.unwrap();
        actor.await.unwrap();
    }
}
