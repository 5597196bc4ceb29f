//! FileSystem Actor
//!
//! Watches the source tree and sends debounced rebuild requests to the
//! `BuilderActor`. The watcher starts before the initial build is queued,
//! so edits made during that build are not lost.
//!
//! ```text
//! Watcher → Debouncer (timing) → Classifier (output dir, existence) → BuildMsg
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::asset::BuildOutput;
use crate::cli::serve::DevServerSession;
use crate::config::PipelineConfig;

// Raw changes -> actionable events.
mod classifier;
// Timing and dedup.
mod debouncer;
// Actionable events -> BuildMsg.
mod router;
mod types;
// Watch root attach/re-attach.
mod watch_roots;


use classifier::EventClassifier;
use debouncer::Debouncer;
use router::{events_to_message, log_events};
use watch_roots::WatchRoots;

/// Upper bound between watch root checks while no events arrive.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

pub struct FsActor {
    /// notify callback -> forwarding thread
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    config: Arc<PipelineConfig>,
    /// Source of the files read by the last good build.
    session: Arc<DevServerSession>,
}

impl FsActor {
    /// Start watching `paths` immediately.
    pub fn new(
        paths: Vec<PathBuf>,
        build_tx: mpsc::Sender<BuildMsg>,
        config: Arc<PipelineConfig>,
        session: Arc<DevServerSession>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
            config,
            session,
        })
    }

    /// Run until the builder goes away (`Ok`) or the watcher dies (`Err`).
    pub async fn run(self) -> Result<()> {
        let notify_rx = self.notify_rx;
        let build_tx = self.build_tx;
        let config = self.config;
        let mut debouncer = self.debouncer;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;
        let session = self.session;
        let mut followed: Option<Arc<BuildOutput>> = None;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => bail!("file watcher stopped"),
                },
                _ = tokio::time::sleep(debouncer.sleep_duration().min(MAINTAIN_INTERVAL)) => {
                    if let Some(output) = session.last_output()
                        && !followed.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &output))
                    {
                        watch_roots.follow(output.sources());
                        followed = Some(output);
                    }
                    watch_roots.maintain(&mut watcher);
                    if !forward_changes(&mut debouncer, &build_tx, &config).await {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Returns `false` once the `BuilderActor` is gone.
async fn forward_changes(
    debouncer: &mut Debouncer,
    build_tx: &mpsc::Sender<BuildMsg>,
    config: &PipelineConfig,
) -> bool {
    let Some(raw) = debouncer.take_if_ready() else {
        return true;
    };
    let Some(events) = EventClassifier::classify(raw, config) else {
        return true;
    };

    log_events(&events);
    build_tx.send(events_to_message(events)).await.is_ok()
}
