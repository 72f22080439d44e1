//! Loading of compiled contract artifacts.
//!
//! Both the Hardhat (`"bytecode": "0x..."`) and Foundry
//! (`"bytecode": { "object": "0x..." }`) artifact layouts are understood.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::{
    constants::ARTIFACT_EXTENSION,
    errors::ScriptError,
};

/// The creation bytecode as found in either artifact layout
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat
    Hex(Bytes),
    /// Foundry
    Object {
        /// The hex-encoded creation bytecode
        object: Bytes,
    },
}

/// The subset of an artifact file the scripts read
#[derive(Deserialize)]
struct RawArtifact {
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// A compiled contract
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// The contract name
    pub name: String,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON contents
    pub fn from_json(name: &str, json: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))?;

        let bytecode = match raw.bytecode {
            RawBytecode::Hex(bytes) | RawBytecode::Object { object: bytes } => bytes,
        };

        // Interfaces and abstract contracts compile to an empty bytecode
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has no creation bytecode",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            bytecode,
        })
    }

    /// The creation bytecode followed by the ABI-encoded constructor arguments
    pub fn deploy_code(&self, constructor_args: &[u8]) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(constructor_args);
        code.into()
    }
}

/// A directory tree of compilation artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The root of the artifacts tree
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root of the artifacts tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the artifact for the given contract name
    pub fn load(&self, name: &str) -> Result<ContractArtifact, ScriptError> {
        let path = self.find(name)?;
        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        ContractArtifact::from_json(name, &contents)
    }

    /// Find the path of the artifact for the given contract name
    pub fn find(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let file_name = format!("{}.{}", name, ARTIFACT_EXTENSION);
        find_file(&self.root, &file_name)?
            .ok_or_else(|| ScriptError::ArtifactNotFound(name.to_string()))
    }
}

/// Depth-first search for a file with the given name
fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>, ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactNotFound(format!("{}: {}", dir.display(), e)))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            subdirs.push(path);
            continue;
        }

        if path.file_name().is_some_and(|n| n == file_name) {
            return Ok(Some(path));
        }
    }

    // Sort for a deterministic pick when a name appears more than once
    subdirs.sort();
    for subdir in subdirs {
        if let Some(path) = find_file(&subdir, file_name)? {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
