//! Global config with atomic reload support.
//!
//! `arc-swap` gives lock-free reads and atomic replacement, so the serve
//! loop can pick up `pagepack.toml` edits between builds.

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<PipelineConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(PipelineConfig::default()));

/// Hash of the config file content the current config was loaded from.
static CONFIG_HASH: Mutex<Option<String>> = Mutex::new(None);

#[inline]
pub fn cfg() -> Arc<PipelineConfig> {
    CONFIG.load_full()
}

fn file_hash(config: &PipelineConfig) -> Option<String> {
    std::fs::read(&config.config_path)
        .ok()
        .map(|bytes| crate::asset::hash::content_hash(&bytes))
}

/// Reload config from disk if content changed.
///
/// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged.
pub fn reload_config() -> Result<bool> {
    let current = cfg();
    let cli = current
        .cli
        .context("config was not loaded from the command line")?;

    let new_hash = file_hash(&current);
    if *CONFIG_HASH.lock() == new_hash {
        return Ok(false);
    }

    let new_config = PipelineConfig::load(cli)?;
    CONFIG.store(Arc::new(new_config));
    *CONFIG_HASH.lock() = new_hash;

    Ok(true)
}

#[inline]
pub fn init_config(config: PipelineConfig) -> Arc<PipelineConfig> {
    *CONFIG_HASH.lock() = file_hash(&config);

    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
