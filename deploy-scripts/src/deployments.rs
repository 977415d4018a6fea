//! The on-disk record of deployed contract addresses.
//!
//! One deployments file per network. Records are created on first deploy
//! and re-used across runs, which is what makes re-running the deploy
//! scripts idempotent. The integration tests and downstream tooling read
//! addresses from this file by contract name.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// A single deployed contract record
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The address the contract was deployed at
    pub address: Address,
    /// The hash of the deployment transaction
    pub tx_hash: TxHash,
    /// The keccak hash of the creation bytecode the contract was deployed
    /// from, used to detect stale records when re-deploying.
    ///
    /// `None` for contracts without their own creation transaction, e.g.
    /// the proxy admin, which the proxy constructor deploys internally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytecode_hash: Option<B256>,
}

/// The set of contracts deployed to a single network
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployments {
    /// The chain id the records belong to
    pub chain_id: u64,
    /// The deployed contract records, keyed by contract name
    pub contracts: BTreeMap<String, DeploymentRecord>,
    /// The path the records are persisted at
    #[serde(skip)]
    path: PathBuf,
}

impl Deployments {
    /// Load the deployments file at the given path, or start an empty one
    /// if no file exists yet.
    ///
    /// Fails with [`ScriptError::ChainMismatch`] when the file on disk was
    /// written for a different chain than the endpoint reports.
    pub fn load(path: &Path, chain_id: u64) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Deployments {
                chain_id,
                contracts: BTreeMap::new(),
                path: path.to_path_buf(),
            });
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        let mut deployments: Deployments = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        deployments.path = path.to_path_buf();

        if deployments.chain_id != chain_id {
            return Err(ScriptError::ChainMismatch {
                expected: chain_id,
                found: deployments.chain_id,
            });
        }

        Ok(deployments)
    }

    /// The path the records are persisted at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record for the named contract, if one exists
    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.contracts.get(name)
    }

    /// The address of the named contract
    pub fn address_of(&self, name: &str) -> Result<Address, ScriptError> {
        self.get(name)
            .map(|record| record.address)
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!("no record for {} in deployments file", name))
            })
    }

    /// Insert (or replace) the record for the named contract and persist
    /// the file.
    pub fn record(&mut self, name: &str, record: DeploymentRecord) -> Result<(), ScriptError> {
        self.contracts.insert(name.to_string(), record);
        self.write()
    }

    /// Write the records to disk as pretty-printed JSON
    fn write(&self) -> Result<(), ScriptError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
            }
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

        fs::write(&self.path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempdir::TempDir;

    use super::*;

    fn dummy_record(byte: u8) -> DeploymentRecord {
        DeploymentRecord {
            address: Address::from([byte; 20]),
            tx_hash: TxHash::from([byte; 32]),
            bytecode_hash: Some(B256::from([byte; 32])),
        }
    }

    #[test]
    fn test_fresh_store() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        let deployments = Deployments::load(&path, 31337).unwrap();
        assert_eq!(deployments.chain_id, 31337);
        assert!(deployments.contracts.is_empty());
        assert!(deployments.address_of("LinkToken").is_err());
    }

    #[test]
    fn test_record_round_trip() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        let mut deployments = Deployments::load(&path, 31337).unwrap();
        deployments.record("LinkToken", dummy_record(0x11)).unwrap();
        deployments
            .record("VRFCoordinatorMock", dummy_record(0x22))
            .unwrap();

        // The wire format is stable: camelCase keys, addresses as hex
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("chainId"));
        assert!(raw.contains("txHash"));

        let reloaded = Deployments::load(&path, 31337).unwrap();
        assert_eq!(
            reloaded.address_of("LinkToken").unwrap(),
            Address::from([0x11; 20])
        );
        let record = reloaded.get("VRFCoordinatorMock").unwrap();
        assert_eq!(record.tx_hash, TxHash::from([0x22; 32]));
        assert_eq!(record.bytecode_hash, Some(B256::from([0x22; 32])));
    }

    #[test]
    fn test_chain_mismatch() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        let mut deployments = Deployments::load(&path, 31337).unwrap();
        deployments.record("CryptoBooks", dummy_record(0x33)).unwrap();

        let err = Deployments::load(&path, 80001).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ChainMismatch {
                expected: 80001,
                found: 31337,
            }
        ));
    }

    #[test]
    fn test_replaces_existing_record() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        let mut deployments = Deployments::load(&path, 31337).unwrap();
        deployments.record("CryptoBooks", dummy_record(0x44)).unwrap();
        deployments.record("CryptoBooks", dummy_record(0x55)).unwrap();

        let reloaded = Deployments::load(&path, 31337).unwrap();
        assert_eq!(reloaded.contracts.len(), 1);
        assert_eq!(
            reloaded.address_of("CryptoBooks").unwrap(),
            Address::from_str("0x5555555555555555555555555555555555555555").unwrap()
        );
    }
}
