//! Chunk assignment and emission.
//!
//! Chunk 0 is the main chunk: the entry's static closure. Every
//! dynamic-import target not yet placed roots the next async chunk, which
//! takes the target's static closure minus modules already placed.

use super::graph::{ModuleGraph, ModuleId};
use super::rewrite::{js_string, rewrite};
use crate::asset::hash::hashed_name;
use crate::asset::minify::minify_js;
use crate::asset::{AssetManifest, BuildOutput};
use crate::core::BuildMode;
use crate::embed::bundle::{CHUNK_QUEUE, RUNTIME_JS, RuntimeVars};
use crate::pipeline::BuildError;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Output directory of every chunk.
const JS_DIR: &str = "assets/js";

pub type ChunkId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub modules: BTreeSet<ModuleId>,
}

/// Module placement across chunks.
#[derive(Debug, Default)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
    /// Dynamic-import target → async chunks it needs, ascending.
    pub loads: FxHashMap<ModuleId, Vec<ChunkId>>,
}

impl ChunkPlan {
    pub fn new(graph: &ModuleGraph) -> Self {
        if graph.is_empty() {
            return Self::default();
        }

        let main = graph.static_closure(ModuleGraph::ENTRY);
        let mut owner: FxHashMap<ModuleId, ChunkId> = main.iter().map(|&m| (m, 0)).collect();
        let mut chunks = vec![Chunk { id: 0, modules: main }];
        let mut targets = Vec::new();

        let mut index = 0;
        while index < chunks.len() {
            let members: Vec<ModuleId> = chunks[index].modules.iter().copied().collect();
            for module in members {
                for target in graph.module(module).dynamic_modules() {
                    targets.push(target);
                    if owner.contains_key(&target) {
                        continue;
                    }
                    let id = chunks.len();
                    let modules: BTreeSet<ModuleId> = graph
                        .static_closure(target)
                        .into_iter()
                        .filter(|m| !owner.contains_key(m))
                        .collect();
                    owner.extend(modules.iter().map(|&m| (m, id)));
                    chunks.push(Chunk { id, modules });
                }
            }
            index += 1;
        }

        let mut loads = FxHashMap::default();
        for target in targets {
            loads.entry(target).or_insert_with(|| {
                graph
                    .static_closure(target)
                    .iter()
                    .filter_map(|m| owner.get(m).copied())
                    .filter(|&chunk| chunk != 0)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>()
            });
        }
        loads.retain(|_, chunks| !chunks.is_empty());

        Self { chunks, loads }
    }

    /// Chunk holding `module`.
    pub fn owner(&self, module: ModuleId) -> Option<ChunkId> {
        self.chunks
            .iter()
            .find(|c| c.modules.contains(&module))
            .map(|c| c.id)
    }
}

/// Emit every chunk into `output` and register its manifest role.
///
/// Async chunks are rendered in parallel; the main chunk embeds their file
/// names, so it is rendered and hashed last.
pub fn emit(graph: &ModuleGraph, mode: BuildMode, output: &mut BuildOutput) -> Result<(), BuildError> {
    let plan = ChunkPlan::new(graph);
    let Some((main, rest)) = plan.chunks.split_first() else {
        return Ok(());
    };

    let emitted = rest
        .par_iter()
        .map(|chunk| {
            let role = AssetManifest::chunk_role(chunk.id);
            let modules = render_modules(graph, &plan, chunk);
            let code = format!("({CHUNK_QUEUE} = {CHUNK_QUEUE} || []).push([{}, {modules}]);\n", chunk.id);
            let code = finish(&role, code, mode)?;
            let path = format!("{JS_DIR}/{}", hashed_name(code.as_bytes(), "js"));
            Ok((chunk.id, role, path, code))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    let chunk_files = emitted
        .iter()
        .map(|(id, _, path, _)| {
            let file = path.rsplit('/').next().unwrap_or(path);
            format!("{}: {}", js_string(&id.to_string()), js_string(file))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let modules = render_modules(graph, &plan, main);
    let code = RUNTIME_JS.render(&RuntimeVars {
        modules,
        chunks: format!("{{{chunk_files}}}"),
        entry: ModuleGraph::ENTRY,
    });
    let code = finish(AssetManifest::MAIN_JS, code, mode)?;
    let main_path = format!("{JS_DIR}/{}", hashed_name(code.as_bytes(), "js"));

    for (_, role, path, code) in emitted {
        output.manifest_mut().insert(role, path.clone())?;
        output.insert(path, code);
    }
    output.manifest_mut().insert(AssetManifest::MAIN_JS, main_path.clone())?;
    output.insert(main_path, code);
    Ok(())
}

/// `{ id: factory, ... }` for the chunk's modules.
fn render_modules(graph: &ModuleGraph, plan: &ChunkPlan, chunk: &Chunk) -> String {
    let factories = chunk
        .modules
        .iter()
        .map(|&id| {
            let module = graph.module(id);
            format!("{id}: {}", rewrite(module, &plan.loads))
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{factories}\n}}")
}

fn finish(role: &str, code: String, mode: BuildMode) -> Result<String, BuildError> {
    if mode.minifies() {
        Ok(minify_js(role, &code)?)
    } else {
        Ok(code)
    }
}
