//! One build, from source directory to [`BuildOutput`].
//!
//! # Flow
//!
//! ```text
//! ┌───────────────┐   ┌──────────────────┐
//! │ discover      │ ∥ │ resolve graph    │   rayon::join
//! └──────┬────────┘   └────────┬─────────┘
//!        │            ┌────────┴─────────┐
//!        │            │ style::compile   │   main.css
//!        │            │ bundle::emit     │   main.js, chunk.<n>.js
//!        │            │ binary assets    │   fonts, images
//!        │            └────────┬─────────┘
//!        └──────────┬──────────┘
//!          page::compose_all                 <page>.html
//! ```
//!
//! A build is a pure function of the source tree and the config: it never
//! writes to the output directory and embeds no timestamps.

mod error;

pub use error::BuildError;

use crate::asset::{BinaryAssets, BuildOutput};
use crate::bundle::{self, ModuleGraph, Resolver};
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::page;
use crate::purge::Safelist;
use crate::{debug, style};
use lightningcss::targets::Targets;
use std::path::PathBuf;
use std::time::Instant;

/// Settings shared by every stage of one build.
pub struct BuildContext<'a> {
    pub config: &'a PipelineConfig,
    pub mode: BuildMode,
    pub targets: Targets,
    pub safelist: Safelist,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a PipelineConfig, mode: BuildMode) -> Result<Self, BuildError> {
        let targets = match config.build.browsers().map_err(BuildError::Config)? {
            Some(browsers) => Targets::from(browsers),
            None => Targets::default(),
        };
        let safelist = Safelist::from_config(&config.purge.safelist)
            .map_err(|e| BuildError::Config(format!("purge.safelist: {e}")))?;
        Ok(Self {
            config,
            mode,
            targets,
            safelist,
        })
    }
}

/// Run the whole pipeline.
pub fn build(config: &PipelineConfig, mode: BuildMode) -> Result<BuildOutput, BuildError> {
    let started = Instant::now();
    let ctx = BuildContext::new(config, mode)?;
    let build = &config.build;

    let (pages, graph) = rayon::join(
        || page::discover(&build.source, &build.templates),
        || resolve_graph(config),
    );
    let (pages, graph) = (pages?, graph?);

    let mut output = BuildOutput::new();

    let styles: Vec<PathBuf> = graph
        .styles
        .iter()
        .chain(build.styles.iter().filter(|s| !graph.styles.contains(s)))
        .cloned()
        .collect();
    let style_inputs = style::compile(&styles, &ctx, &mut output)?;

    bundle::emit(&graph, mode, &mut output)?;

    let mut binary = BinaryAssets::new();
    for asset in style_inputs.assets.iter().chain(&graph.assets) {
        binary.add(asset)?;
    }
    output.extend_binary(binary);

    output.add_sources(graph.modules.iter().map(|m| &m.path));
    output.add_sources(&styles);
    output.add_sources(&style_inputs.imports);
    output.add_sources(
        style_inputs
            .assets
            .iter()
            .chain(&graph.assets)
            .map(|a| &a.source),
    );

    page::compose_all(&pages, &mut output)?;

    debug!(
        "build";
        "{} page(s), {} module(s), {} file(s) in {:?} ({mode})",
        pages.len(),
        graph.modules.len(),
        output.len(),
        started.elapsed()
    );
    Ok(output)
}

/// Module graph of `build.entry`; empty when there is no entry file.
fn resolve_graph(config: &PipelineConfig) -> Result<ModuleGraph, BuildError> {
    let entry = &config.build.entry;
    if !entry.is_file() {
        debug!("bundle"; "no entry at {}, skipping scripts", config.root_relative(entry).display());
        return Ok(ModuleGraph::default());
    }
    let resolver = Resolver::new(&config.root, &config.build.alias);
    Ok(ModuleGraph::resolve(entry, &resolver)?)
}
