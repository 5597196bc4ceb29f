//! Output composition: asset tags into page templates.
//!
//! Pages are opaque text. Stylesheet links go before `</head>`, deferred
//! scripts before the descriptor's injection point; a missing tag means
//! append.

use super::PageDescriptor;
use crate::asset::BuildOutput;
use crate::utils::html::{escape, insert_before};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("failed to read template `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("manifest role `{role}` points to `{path}`, which was not emitted")]
    MissingAsset { role: String, path: String },
}

/// Compose one page against the assets in `output`.
pub fn compose(page: &PageDescriptor, output: &BuildOutput) -> Result<String, CompositionError> {
    let manifest = output.manifest();
    for (role, path) in manifest.iter() {
        if !output.contains(path) {
            return Err(CompositionError::MissingAsset {
                role: role.to_string(),
                path: path.to_string(),
            });
        }
    }

    let mut html = fs::read_to_string(&page.source_path).map_err(|source| CompositionError::Read {
        path: page.source_path.clone(),
        source,
    })?;

    let links: String = manifest
        .stylesheets()
        .map(|href| format!("<link rel=\"stylesheet\" href=\"{}\">", escape(href)))
        .collect();
    if !links.is_empty() {
        insert_before(&mut html, "</head>", &links);
    }

    let scripts: String = manifest
        .entry_scripts()
        .map(|src| format!("<script defer src=\"{}\"></script>", escape(src)))
        .collect();
    if !scripts.is_empty() {
        insert_before(&mut html, page.injection_point.closing_tag(), &scripts);
    }

    Ok(html)
}

/// Compose every page and add it to `output`.
pub fn compose_all(pages: &[PageDescriptor], output: &mut BuildOutput) -> Result<(), CompositionError> {
    let assets: &BuildOutput = output;
    let composed = pages
        .par_iter()
        .map(|page| compose(page, assets).map(|html| (page.output_filename.clone(), html)))
        .collect::<Result<Vec<_>, _>>()?;

    for (name, html) in composed {
        output.insert(name, html);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::InjectionPoint;
    use tempfile::TempDir;

    fn page(dir: &TempDir, name: &str, html: &str, injection_point: InjectionPoint) -> PageDescriptor {
        let source_path = dir.path().join(name);
        fs::write(&source_path, html).unwrap();
        PageDescriptor {
            source_path,
            output_filename: name.to_string(),
            injection_point,
        }
    }

    fn output_with_assets() -> BuildOutput {
        let mut output = BuildOutput::new();
        output.insert("assets/css/aaa.css", ".btn{}");
        output.insert("assets/js/bbb.js", "run()");
        output.manifest_mut().insert("main.css", "assets/css/aaa.css").unwrap();
        output.manifest_mut().insert("main.js", "assets/js/bbb.js").unwrap();
        output
    }

    #[test]
    fn test_compose_body() {
        let dir = TempDir::new().unwrap();
        let page = page(
            &dir,
            "index.html",
            "<html><head><title>t</title></head><body><p class=\"btn\">x</p></body></html>",
            InjectionPoint::Body,
        );

        let html = compose(&page, &output_with_assets()).unwrap();
        assert_eq!(
            html,
            "<html><head><title>t</title><link rel=\"stylesheet\" href=\"assets/css/aaa.css\"></head>\
             <body><p class=\"btn\">x</p><script defer src=\"assets/js/bbb.js\"></script></body></html>"
        );
    }

    #[test]
    fn test_compose_head() {
        let dir = TempDir::new().unwrap();
        let page = page(&dir, "a.html", "<head></head><body></body>", InjectionPoint::Head);

        let html = compose(&page, &output_with_assets()).unwrap();
        assert_eq!(
            html,
            "<head><link rel=\"stylesheet\" href=\"assets/css/aaa.css\">\
             <script defer src=\"assets/js/bbb.js\"></script></head><body></body>"
        );
    }

    #[test]
    fn test_compose_fragment_appends() {
        let dir = TempDir::new().unwrap();
        let page = page(&dir, "frag.html", "<p>hi</p>", InjectionPoint::Body);

        let html = compose(&page, &output_with_assets()).unwrap();
        assert!(html.starts_with("<p>hi</p>"));
        assert!(html.ends_with("<script defer src=\"assets/js/bbb.js\"></script>"));
    }

    #[test]
    fn test_compose_no_assets_unchanged() {
        let dir = TempDir::new().unwrap();
        let page = page(&dir, "a.html", "<head></head><body></body>", InjectionPoint::Body);
        let html = compose(&page, &BuildOutput::new()).unwrap();
        assert_eq!(html, "<head></head><body></body>");
    }

    #[test]
    fn test_compose_missing_asset() {
        let dir = TempDir::new().unwrap();
        let page = page(&dir, "a.html", "<body></body>", InjectionPoint::Body);

        let mut output = BuildOutput::new();
        output.manifest_mut().insert("main.js", "assets/js/gone.js").unwrap();
        let err = compose(&page, &output).unwrap_err();
        assert!(matches!(err, CompositionError::MissingAsset { ref role, .. } if role == "main.js"));
    }

    #[test]
    fn test_compose_idempotent() {
        let dir = TempDir::new().unwrap();
        let page = page(&dir, "a.html", "<head></head><body></body>", InjectionPoint::Body);
        let output = output_with_assets();
        assert_eq!(compose(&page, &output).unwrap(), compose(&page, &output).unwrap());
    }

    #[test]
    fn test_compose_all_inserts_pages() {
        let dir = TempDir::new().unwrap();
        let pages = vec![
            page(&dir, "index.html", "<body></body>", InjectionPoint::Body),
            page(&dir, "about.html", "<body></body>", InjectionPoint::Body),
        ];
        let mut output = output_with_assets();
        compose_all(&pages, &mut output).unwrap();
        assert!(output.contains("index.html"));
        assert!(output.contains("about.html"));
    }
}
