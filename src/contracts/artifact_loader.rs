use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use ethers::{abi::Abi, types::Bytes};
use ignore::WalkBuilder;
use serde::Deserialize;

use crate::error::ChainError;

/// The parts of a hardhat build artifact needed to deploy and call a contract.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Hardhat writes compiler inputs here; they are never contract artifacts.
const BUILD_INFO_DIR: &str = "build-info";

/// Finds `<name>.json` anywhere below `dir`. Hardhat nests artifacts as
/// `contracts/<File>.sol/<Name>.json` next to `<Name>.dbg.json` files.
/// Paths are visited in sorted order so the first match is stable.
pub fn find_artifact(dir: &Path, name: &str) -> Result<PathBuf, ChainError> {
    let file_name = format!("{}.json", name);
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != BUILD_INFO_DIR)
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| {
            ChainError::Artifact(format!("Failed to read {}: {}", dir.display(), e))
        })?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && entry.file_name() == file_name.as_str() {
            return Ok(entry.into_path());
        }
    }

    Err(ChainError::Artifact(format!(
        "No artifact named {} under {}",
        file_name,
        dir.display()
    )))
}

pub fn load_artifact(dir: &Path, name: &str) -> Result<Artifact, ChainError> {
    let path = find_artifact(dir, name)?;
    let json_content = fs::read_to_string(&path).map_err(|e| {
        ChainError::Artifact(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&json_content).map_err(|e| {
        ChainError::Artifact(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Loads each artifact once per session.
pub struct ArtifactStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Artifact>>>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Artifact>, ChainError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ChainError::Artifact("artifact cache poisoned".to_string()))?;
        if let Some(artifact) = cache.get(name) {
            return Ok(artifact.clone());
        }
        let artifact = Arc::new(load_artifact(&self.dir, name)?);
        cache.insert(name.to_string(), artifact.clone());
        Ok(artifact)
    }
}
