//! HTTP response handlers.

use super::content::maybe_inject_hotreload;
use super::session::DevServerSession;
use crate::asset::BuildOutput;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};
use anyhow::Result;
use std::path::Path;
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a file from the build output.
pub fn respond_output(request: Request, key: &str, body: &[u8], ws_port: Option<u16>) -> Result<()> {
    let content_type = crate::utils::mime::from_path(Path::new(key));

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = maybe_inject_hotreload(body.to_vec(), content_type, ws_port);
    send_body(request, 200, content_type, body)
}

/// Respond with 404, using the build's own `404.html` when it has one.
pub fn respond_not_found(request: Request, output: &BuildOutput, ws_port: Option<u16>) -> Result<()> {
    let custom = output.get("404.html");

    if is_head_request(&request) {
        let mime = if custom.is_some() { HTML } else { PLAIN };
        return send_head(request, 404, mime);
    }

    match custom {
        Some(body) => {
            let body = maybe_inject_hotreload(body.to_vec(), HTML, ws_port);
            send_body(request, 404, HTML, body)
        }
        None => send_body(request, 404, PLAIN, b"404 Not Found".to_vec()),
    }
}

/// Respond before any successful build: building, or the first build's error.
pub fn respond_status(request: Request, session: &DevServerSession) -> Result<()> {
    use crate::embed::serve::{STATUS_HTML, StatusVars};

    let vars = match session.last_error() {
        Some(failure) => StatusVars {
            title: "Build failed",
            detail: crate::utils::html::escape(&failure.to_string()).into_owned(),
            refresh: 0,
        },
        None => StatusVars {
            title: "Building",
            detail: "The first build is running.".to_string(),
            refresh: 1,
        },
    };

    let body = STATUS_HTML.render(&vars).into_bytes();
    let body = maybe_inject_hotreload(body, HTML, session.ws_port());
    send_body(request, 503, HTML, body)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with hotreload.js from memory.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars};

    let body = HOTRELOAD_JS.render(&HotreloadVars { ws_port });
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache"));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache"));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
