use std::path::{Component, Path, PathBuf};

use crate::config::PipelineConfig;
use crate::utils::path::normalize_path;

/// Every configured input location: source and entry directories, extra
/// stylesheets, alias targets, SCSS load paths, the directories purge
/// content globs start from, and the config file.
///
/// `node_modules` is only watched through the files a build actually
/// reads. The output directory is never watched; paths nested under
/// another watched directory are dropped.
pub(super) fn collect_watch_paths(config: &PipelineConfig) -> Vec<PathBuf> {
    let build = &config.build;
    let mut paths = vec![build.source.clone()];

    if let Some(entry_dir) = build.entry.parent() {
        paths.push(entry_dir.to_path_buf());
    }
    paths.extend(build.styles.iter().cloned());
    paths.extend(build.alias.values().cloned());

    let modules = normalize_path(&config.root.join("node_modules"));
    paths.extend(build.load_paths.iter().filter(|dir| **dir != modules).cloned());
    paths.extend(config.purge.content.iter().map(|pattern| glob_base(pattern)));

    if config.config_path.exists() {
        paths.push(config.config_path.clone());
    }

    paths.retain(|p| !p.starts_with(&build.output));
    dedupe_nested(&mut paths);
    paths
}

/// Leading components of `pattern` that contain no glob metacharacter.
fn glob_base(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !part.to_string_lossy().contains(['*', '?', '[']),
            _ => true,
        })
        .collect()
}

fn dedupe_nested(paths: &mut Vec<PathBuf>) {
    paths.sort();
    paths.dedup();
    let snapshot = paths.clone();
    paths.retain(|path| {
        !snapshot
            .iter()
            .any(|other| other != path && path.starts_with(other))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_inside_source_not_duplicated() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src/js")).unwrap();
        std::fs::write(temp.path().join("pagepack.toml"), "").unwrap();
        let config = PipelineConfig::for_root(temp.path());

        let paths = collect_watch_paths(&config);
        assert_eq!(
            paths,
            vec![config.config_path.clone(), config.build.source.clone()]
        );
    }

    #[test]
    fn test_outside_styles_and_output_excluded() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        let mut config = PipelineConfig::for_root(temp.path());
        let vendor = config.root.join("vendor/theme.scss");
        let generated = config.build.output.join("gen.scss");
        config.build.styles = vec![vendor.clone(), generated];

        let paths = collect_watch_paths(&config);
        assert!(paths.contains(&vendor));
        assert!(paths.contains(&config.build.source));
        assert!(!paths.iter().any(|p| p.starts_with(&config.build.output)));
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("/site/templates/**/*.html"), PathBuf::from("/site/templates"));
        assert_eq!(glob_base("/site/pages/index.html"), PathBuf::from("/site/pages/index.html"));
        assert_eq!(glob_base("/site/[ab]/*.js"), PathBuf::from("/site"));
    }

    #[test]
    fn test_content_alias_and_load_paths_watched() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::create_dir_all(temp.path().join("node_modules")).unwrap();
        let mut config = PipelineConfig::for_root(temp.path());
        let templates = config.root.join("templates");
        let bootstrap = config.root.join("lib/bootstrap.esm.js");
        let scss = config.root.join("vendor/scss");
        config.purge.content = vec![templates.join("**/*.html").to_string_lossy().into_owned()];
        config.build.alias.insert("bootstrap".into(), bootstrap.clone());
        config.build.load_paths.push(scss.clone());

        let paths = collect_watch_paths(&config);
        assert!(paths.contains(&templates), "{paths:?}");
        assert!(paths.contains(&bootstrap), "{paths:?}");
        assert!(paths.contains(&scss), "{paths:?}");
        assert!(!paths.iter().any(|p| p.ends_with("node_modules")), "{paths:?}");
    }
}
