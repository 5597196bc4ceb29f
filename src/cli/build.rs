//! `pagepack build`: one pipeline run written to the output directory.

use crate::config::PipelineConfig;
use crate::{log, pipeline};
use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;

/// Build and write the output directory.
///
/// With `--clean` the output directory is removed first; otherwise stale
/// hashed files from earlier builds stay in place.
pub fn build_site(config: &PipelineConfig) -> Result<()> {
    let started = Instant::now();
    let mode = config.build_mode();
    let output_dir = &config.build.output;

    let output = pipeline::build(config, mode)?;

    if config.build.clean && output_dir.exists() {
        fs::remove_dir_all(output_dir)
            .with_context(|| format!("failed to clean {}", output_dir.display()))?;
    }
    output
        .write_to(output_dir)
        .with_context(|| format!("failed to write {}", output_dir.display()))?;

    log!(
        "build";
        "{} files ({}) in {:.0?} -> {}",
        output.len(),
        mode,
        started.elapsed(),
        config.root_relative(output_dir).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::write(src.join("index.html"), "<html><body></body></html>").unwrap();
        fs::write(src.join("js/main.js"), "console.log('hi');\n").unwrap();
        let config = PipelineConfig::for_root(dir.path());
        (dir, config)
    }

    #[test]
    fn test_build_writes_output() {
        let (_dir, config) = site();
        build_site(&config).unwrap();

        let index = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert!(index.contains("assets/js/"));
        assert!(config.build.output.join("assets/js").is_dir());
    }

    #[test]
    fn test_clean_removes_stale_files() {
        let (_dir, mut config) = site();
        let stale = config.build.output.join("assets/js/0000.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        build_site(&config).unwrap();
        assert!(stale.exists());

        config.build.clean = true;
        build_site(&config).unwrap();
        assert!(!stale.exists());
        assert!(config.build.output.join("index.html").exists());
    }

    #[test]
    fn test_failed_build_leaves_output_alone() {
        let (dir, mut config) = site();
        fs::write(dir.path().join("src/js/main.js"), "import './missing.js';\n").unwrap();
        let kept = config.build.output.join("keep.txt");
        fs::create_dir_all(&config.build.output).unwrap();
        fs::write(&kept, "").unwrap();

        config.build.clean = true;
        assert!(build_site(&config).is_err());
        assert!(kept.exists());
    }
}
