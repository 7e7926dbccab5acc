//! Generator for the `kroma-bindings` crate.
//!
//! For each contract in the contract list the generator reads the forge artifact and writes
//!
//! * `artifacts/<Name>.json`: ABI and creation bytecode, consumed by `alloy::sol!`,
//! * `artifacts/more/<Name>.json`: canonical storage layout, deployed bytecode and immutable
//!   reference flag, served by `kroma_bindings::registry`,
//! * `src/bindings/<name>.rs`: the binding module itself,
//!
//! and finally regenerates `src/bindings/mod.rs` from every artifact present in the output tree.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context};
use clap::Parser;
use kroma_bindings::registry::ContractMetadata;
use serde::Serialize;
use tracing::info_span;

pub mod artifact;
pub mod canonicalize;
pub mod render;

use crate::{
    artifact::{ArtifactIndex, Bytecode, ForgeArtifact},
    canonicalize::canonicalize_ast_ids,
};

/// Generate Rust bindings for the Kroma contracts from forge build artifacts.
#[derive(Clone, Debug, Parser)]
pub struct Options {
    /// Forge artifacts directory (the `forge-artifacts` output of `forge build`).
    #[clap(long, env = "KROMA_FORGE_ARTIFACTS")]
    pub forge_artifacts: PathBuf,

    /// JSON file holding the list of contract names to generate bindings for.
    #[clap(long, default_value = "contracts/rust/gen/artifacts.json")]
    pub contracts: PathBuf,

    /// Root of the bindings crate to write into.
    #[clap(long, default_value = "contracts/rust/bindings")]
    pub out: PathBuf,

    /// Base of the monorepo.
    ///
    /// Stripped from absolute contract paths in storage layouts, so the committed layouts do not
    /// depend on where the contracts were compiled.
    #[clap(long, env = "KROMA_MONOREPO_BASE")]
    pub monorepo_base: String,

    /// Contracts whose deployed source map is kept in the registry metadata.
    #[clap(long, value_delimiter = ',')]
    pub source_maps: Vec<String>,
}

#[derive(Serialize)]
struct BindingArtifact<'a> {
    abi: &'a serde_json::Value,
    bytecode: &'a Bytecode,
}

pub fn read_contract_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("error reading contract list {}", path.display()))?;
    let contracts: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("error parsing contract list {}", path.display()))?;
    ensure!(!contracts.is_empty(), "must define a list of contracts");
    Ok(contracts)
}

pub fn generate(opt: &Options) -> anyhow::Result<()> {
    let contracts = read_contract_list(&opt.contracts)?;
    tracing::info!(monorepo_base = %opt.monorepo_base, "using monorepo base");

    let index = ArtifactIndex::scan(&opt.forge_artifacts)?;
    let source_maps: HashSet<_> = opt.source_maps.iter().map(String::as_str).collect();

    let artifacts_dir = opt.out.join("artifacts");
    let more_dir = artifacts_dir.join("more");
    let bindings_dir = opt.out.join("src").join("bindings");
    for dir in [&more_dir, &bindings_dir] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for name in &contracts {
        let span = info_span!("generate", contract = %name);
        let _enter = span.enter();

        let path = index.resolve(name)?;
        tracing::info!(artifact = %path.display(), "using forge artifact");
        let artifact = ForgeArtifact::load(&path)?;

        write_json(
            &artifacts_dir.join(format!("{name}.json")),
            &BindingArtifact {
                abi: &artifact.abi,
                bytecode: &artifact.bytecode,
            },
        )?;

        let metadata = ContractMetadata {
            storage_layout: canonicalize_ast_ids(&artifact.storage_layout, &opt.monorepo_base),
            deployed_bytecode: artifact.deployed_bytecode.object.clone(),
            deployed_source_map: source_maps
                .contains(name.as_str())
                .then(|| artifact.deployed_bytecode.source_map.clone())
                .flatten(),
            has_immutable_references: artifact.has_immutable_references(),
        };
        write_json(&more_dir.join(format!("{name}.json")), &metadata)?;

        let binding = bindings_dir.join(format!("{}.rs", render::module_name(name)));
        fs::write(&binding, render::binding(name))
            .with_context(|| format!("writing {}", binding.display()))?;
        tracing::info!(file = %binding.display(), "wrote binding");
    }

    // Artifacts without a binding file have nothing to declare.
    let bound: Vec<String> = json_stems(&artifacts_dir)?
        .into_iter()
        .filter(|stem| {
            bindings_dir
                .join(format!("{}.rs", render::module_name(stem)))
                .is_file()
        })
        .collect();
    let metadata = json_stems(&more_dir)?;
    let module = bindings_dir.join("mod.rs");
    fs::write(&module, render::bindings_mod(&bound, &metadata))
        .with_context(|| format!("writing {}", module.display()))?;
    tracing::info!(
        bindings = bound.len(),
        registry = metadata.len(),
        "regenerated {}",
        module.display()
    );
    Ok(())
}

fn write_json(path: &Path, value: &impl Serialize) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Names of the `*.json` files directly under `dir`, sorted by module name.
fn json_stems(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort_by_key(|stem| render::module_name(stem));
    Ok(stems)
}
