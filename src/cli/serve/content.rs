//! Hot reload client injection.

use crate::embed::serve::HOTRELOAD_PATH;
use crate::utils::html::insert_before;

/// Inject the hot reload `<script>` into HTML responses when reload is on.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    if ws_port.is_none() || !content_type.starts_with("text/html") {
        return body;
    }
    match String::from_utf8(body) {
        Ok(mut html) => {
            insert_before(&mut html, "</body>", &script_tag());
            html.into_bytes()
        }
        Err(e) => e.into_bytes(),
    }
}

fn script_tag() -> String {
    format!("<script src=\"{HOTRELOAD_PATH}\"></script>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_injected_before_body_end() {
        let body = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = String::from_utf8(maybe_inject_hotreload(body, HTML, Some(35729))).unwrap();
        assert_eq!(
            out,
            "<html><body><p>hi</p><script src=\"/__pagepack/hotreload.js\"></script></body></html>"
        );
    }

    #[test]
    fn test_appended_without_body() {
        let out = maybe_inject_hotreload(b"<p>hi</p>".to_vec(), HTML, Some(1));
        assert!(String::from_utf8(out).unwrap().ends_with("</script>"));
    }

    #[test]
    fn test_untouched_without_reload_or_html() {
        let body = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_hotreload(body.clone(), HTML, None), body);
        assert_eq!(maybe_inject_hotreload(body.clone(), CSS, Some(1)), body);
    }
}
