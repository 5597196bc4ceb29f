//! Development server with live reload support.
//!
//! Requests are answered from the session's last good [`BuildOutput`]
//! in memory; the output directory is only written by `pagepack build`.
//!
//! [`BuildOutput`]: crate::asset::BuildOutput

mod content;
mod lifecycle;
mod path;
mod response;
mod session;

pub use session::{DevServerSession, RebuildOutcome};
#[cfg(test)]
pub use session::ServerState;

use crate::config::PipelineConfig;
use crate::core::register_server;
use crate::embed::serve::HOTRELOAD_PATH;
use crate::log;
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// Bind, start the actors and serve until shutdown.
pub fn serve_site(config: Arc<PipelineConfig>) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let session = Arc::new(DevServerSession::new(config.serve.stale));

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{} ({})", addr, config.build_mode());

    let actors = lifecycle::spawn_actors(config, Arc::clone(&session), shutdown_rx);
    let result = run_request_loop(&server, &session);

    session.stop();
    lifecycle::wait_for_shutdown(actors);
    result
}

fn run_request_loop(server: &Server, session: &Arc<DevServerSession>) -> Result<()> {
    // With `stale = false` requests block on the running build
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let session = Arc::clone(session);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &session) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, session: &DevServerSession) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = session.ws_port();
    if let Some(port) = ws_port
        && request.url() == HOTRELOAD_PATH
    {
        return response::respond_hotreload_js(request, port);
    }

    let Some(output) = session.output_for_request() else {
        return response::respond_status(request, session);
    };

    match path::resolve_path(request.url(), &output) {
        Some(key) => {
            let body = output.get(&key).unwrap_or_default();
            response::respond_output(request, &key, body, ws_port)
        }
        None => response::respond_not_found(request, &output, ws_port),
    }
}
