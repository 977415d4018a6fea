//! Loading of compiled contract artifacts from disk.
//!
//! The deploy scripts consume artifacts produced by an external Solidity
//! build. Both common artifact layouts are supported: a flat
//! `<dir>/<Name>.json` and the per-source `<dir>/<Name>.sol/<Name>.json`
//! nesting.

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::Bytes;
use serde::Deserialize;

use crate::errors::ScriptError;

/// The bytecode field of a compiled artifact.
///
/// Toolchains disagree on the shape: some write the creation bytecode as a
/// bare hex string, others nest it under an `object` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// A bare hex string
    Plain(String),
    /// A hex string nested under an `object` key
    Wrapped {
        /// The hex-encoded creation bytecode
        object: String,
    },
}

impl BytecodeField {
    /// The hex string carried by either shape
    fn as_hex(&self) -> &str {
        match self {
            BytecodeField::Plain(hex) => hex,
            BytecodeField::Wrapped { object } => object,
        }
    }
}

/// A compiled contract artifact
#[derive(Debug, Deserialize)]
pub struct ContractArtifact {
    /// The creation bytecode of the contract
    bytecode: BytecodeField,
}

impl ContractArtifact {
    /// Load the artifact for the named contract from the artifacts directory
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, ScriptError> {
        let flat = artifacts_dir.join(format!("{name}.json"));
        let nested = artifacts_dir.join(format!("{name}.sol")).join(format!("{name}.json"));

        let path = if flat.exists() {
            flat
        } else if nested.exists() {
            nested
        } else {
            return Err(ScriptError::ArtifactParsing(format!(
                "no artifact for {} under {}",
                name,
                artifacts_dir.display(),
            )));
        };

        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        serde_json::from_str(&contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
    }

    /// The creation bytecode of the contract
    pub fn bytecode(&self) -> Result<Bytes, ScriptError> {
        let bytecode = Bytes::from_str(self.bytecode.as_hex())
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(
                "artifact has no deployable bytecode".to_string(),
            ));
        }

        Ok(bytecode)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_flat_artifact() {
        let dir = TempDir::new("artifacts").unwrap();
        fs::write(
            dir.path().join("CryptoBooks.json"),
            r#"{"contractName": "CryptoBooks", "abi": [], "bytecode": "0x6080604052"}"#,
        )
        .unwrap();

        let artifact = ContractArtifact::load(dir.path(), "CryptoBooks").unwrap();
        assert_eq!(
            artifact.bytecode().unwrap(),
            Bytes::from_str("0x6080604052").unwrap()
        );
    }

    #[test]
    fn test_nested_artifact() {
        let dir = TempDir::new("artifacts").unwrap();
        let nested = dir.path().join("LinkToken.sol");
        fs::create_dir(&nested).unwrap();
        fs::write(
            nested.join("LinkToken.json"),
            r#"{"abi": [], "bytecode": {"object": "0xdeadbeef"}}"#,
        )
        .unwrap();

        let artifact = ContractArtifact::load(dir.path(), "LinkToken").unwrap();
        assert_eq!(
            artifact.bytecode().unwrap(),
            Bytes::from_str("0xdeadbeef").unwrap()
        );
    }

    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new("artifacts").unwrap();
        let err = ContractArtifact::load(dir.path(), "CryptoBooks").unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactParsing(_)));
    }

    #[test]
    fn test_invalid_bytecode_hex() {
        let dir = TempDir::new("artifacts").unwrap();
        fs::write(
            dir.path().join("CryptoBooks.json"),
            r#"{"bytecode": "0xnothex"}"#,
        )
        .unwrap();

        let artifact = ContractArtifact::load(dir.path(), "CryptoBooks").unwrap();
        assert!(artifact.bytecode().is_err());
    }

    #[test]
    fn test_empty_bytecode() {
        let dir = TempDir::new("artifacts").unwrap();
        fs::write(dir.path().join("IBook.json"), r#"{"bytecode": "0x"}"#).unwrap();

        let artifact = ContractArtifact::load(dir.path(), "IBook").unwrap();
        assert!(artifact.bytecode().is_err());
    }
}
