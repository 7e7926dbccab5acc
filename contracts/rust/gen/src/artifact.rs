//! Loading forge build artifacts.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use alloy::json_abi::JsonAbi;
use anyhow::{bail, Context};
use kroma_bindings::registry::StorageLayout;
use regex::Regex;
use serde::{Deserialize, Serialize};

static COMPILER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\d+\.\d+\.\d+").unwrap());

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeArtifact {
    pub abi: serde_json::Value,
    pub bytecode: Bytecode,
    pub deployed_bytecode: DeployedBytecode,
    #[serde(default)]
    pub storage_layout: StorageLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bytecode {
    pub object: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedBytecode {
    pub object: String,
    #[serde(default)]
    pub source_map: Option<String>,
    #[serde(default)]
    pub immutable_references: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ForgeArtifact {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read forge artifact {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse forge artifact {}", path.display()))?;
        serde_json::from_value::<JsonAbi>(artifact.abi.clone())
            .with_context(|| format!("invalid abi in {}", path.display()))?;
        Ok(artifact)
    }

    pub fn has_immutable_references(&self) -> bool {
        self.deployed_bytecode
            .immutable_references
            .as_ref()
            .is_some_and(|refs| !refs.is_empty())
    }
}

/// Artifact files under a forge output directory, keyed by contract name.
///
/// Contracts sharing a name are emitted under their full import path, so the standard
/// `<Name>.sol/<Name>.json` location is not always present.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    root: PathBuf,
    paths: BTreeMap<String, PathBuf>,
}

impl ArtifactIndex {
    /// Walks `root` in lexical order. The first artifact seen for a name wins.
    pub fn scan(root: &Path) -> anyhow::Result<Self> {
        let mut index = Self {
            root: root.to_path_buf(),
            paths: BTreeMap::new(),
        };
        index.walk(root)?;
        tracing::debug!(artifacts = index.paths.len(), root = %root.display(), "indexed forge artifacts");
        Ok(index)
    }

    fn walk(&mut self, dir: &Path) -> anyhow::Result<()> {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("failed to read {}", dir.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.walk(&path)?;
                continue;
            }
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = COMPILER_VERSION.replace_all(stem, "").into_owned();
            self.paths.entry(name).or_insert(path);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    /// Path of the artifact for `name`, preferring `<root>/<Name>.sol/<Name>.json`.
    pub fn resolve(&self, name: &str) -> anyhow::Result<PathBuf> {
        let standard = self.root.join(format!("{name}.sol")).join(format!("{name}.json"));
        if standard.is_file() {
            return Ok(standard);
        }
        match self.get(name) {
            Some(path) => {
                tracing::info!(
                    standard = %standard.display(),
                    fallback = %path.display(),
                    "artifact not at standard path"
                );
                Ok(path.to_path_buf())
            },
            None => bail!("cannot find forge artifact of {name:?}"),
        }
    }
}
