//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The target chain has no entry in the network parameter table
    UnknownChain(u64),
    /// A required deployment parameter was not provided
    MissingParameter(String),
    /// The deployments file on disk was written for a different chain
    ChainMismatch {
        /// The chain id reported by the RPC endpoint
        expected: u64,
        /// The chain id recorded in the deployments file
        found: u64,
    },
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownChain(chain_id) => {
                write!(f, "no network parameters for chain id {}", chain_id)
            }
            ScriptError::MissingParameter(s) => write!(f, "missing deployment parameter: {}", s),
            ScriptError::ChainMismatch { expected, found } => write!(
                f,
                "deployments file was written for chain {} but the endpoint reports chain {}",
                found, expected,
            ),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
        }
    }
}

impl Error for ScriptError {}
