//! URL to build output key resolution.

use crate::asset::BuildOutput;
use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file in `output`.
///
/// `/` and directory URLs map to `index.html`; `/about` also finds
/// `about.html`. Any `..` segment is rejected outright.
pub fn resolve_path(url: &str, output: &BuildOutput) -> Option<String> {
    let clean = normalize_url(url)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    if clean.is_empty() {
        return output.contains("index.html").then(|| "index.html".to_string());
    }

    [
        clean.clone(),
        format!("{clean}/index.html"),
        format!("{clean}.html"),
    ]
    .into_iter()
    .find(|key| output.contains(key))
}

/// Decode, strip query and fragment, trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> BuildOutput {
        let mut output = BuildOutput::new();
        output.insert("index.html", "home");
        output.insert("about.html", "about");
        output.insert("docs/index.html", "docs");
        output.insert("assets/css/ab12.css", "css");
        output.insert("assets/fonts/my icon.woff2", "font");
        output
    }

    #[test]
    fn test_root_and_directories() {
        let output = output();
        assert_eq!(resolve_path("/", &output).as_deref(), Some("index.html"));
        assert_eq!(resolve_path("/docs/", &output).as_deref(), Some("docs/index.html"));
        assert_eq!(resolve_path("/about", &output).as_deref(), Some("about.html"));
    }

    #[test]
    fn test_assets_query_and_encoding() {
        let output = output();
        assert_eq!(
            resolve_path("/assets/css/ab12.css?v=1", &output).as_deref(),
            Some("assets/css/ab12.css")
        );
        assert_eq!(
            resolve_path("/assets/fonts/my%20icon.woff2", &output).as_deref(),
            Some("assets/fonts/my icon.woff2")
        );
    }

    #[test]
    fn test_traversal_and_missing() {
        let output = output();
        assert_eq!(resolve_path("/../index.html", &output), None);
        assert_eq!(resolve_path("/docs/%2e%2e/about.html", &output), None);
        assert_eq!(resolve_path("/nope.html", &output), None);
    }
}
