//! The table of per-network deployment parameters, keyed by chain id

use alloy_primitives::{address, b256, Address, B256, U256};

use crate::errors::ScriptError;

// -------------
// | Constants |
// -------------

/// The chain id of a local dev node
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// The chain id of the Polygon Mumbai testnet
pub const MUMBAI_CHAIN_ID: u64 = 80001;

/// The chain ids with an entry in the parameter table
pub const SUPPORTED_CHAIN_IDS: [u64; 2] = [LOCAL_CHAIN_ID, MUMBAI_CHAIN_ID];

/// The oracle fee paid per randomness request, in juels (10^-18 LINK).
///
/// 0.1 LINK on every supported network.
const ORACLE_FEE_JUELS: u128 = 100_000_000_000_000_000;

/// The VRF key hash used on local dev chains.
///
/// The mock coordinator never checks it, but the contract constructor
/// requires one.
const LOCAL_KEY_HASH: B256 =
    b256!("0x6c3699283bda56ad74f6b855546325b68d482e983852a7a82979cc4807b641f4");

/// The key hash of the VRF job on Mumbai
const MUMBAI_KEY_HASH: B256 =
    b256!("0x6e75b569a01ef56d18cab6a8e71e6600d6ce853834d4a5748b720d06f878b3a4");

/// The address of the LINK token on Mumbai
const MUMBAI_LINK_TOKEN: Address = address!("0x326C977E6efc84E512bB9C30f76E30c160eD06FB");

/// The address of the VRF coordinator on Mumbai
const MUMBAI_VRF_COORDINATOR: Address = address!("0x8C7382F9D8f56b33781fE506E897a4F1e2d17255");

/// The block explorer base URL for Mumbai
const MUMBAI_EXPLORER_BASE: &str = "https://mumbai.polygonscan.com";

// ---------
// | Types |
// ---------

/// The class of network being deployed to.
///
/// Local chains get freshly deployed mock oracle contracts, so their
/// entries carry no oracle addresses. Public networks use the live oracle
/// contracts, whose addresses an entry can never omit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkKind {
    /// A local dev node; oracle mocks are deployed on demand
    Local,
    /// A public testnet with live oracle contracts
    Testnet {
        /// The address of the LINK token contract
        link_token: Address,
        /// The address of the VRF coordinator contract
        vrf_coordinator: Address,
    },
}

/// The deployment parameters of a single supported network.
///
/// Resolved once per run from the chain id the RPC endpoint reports, then
/// passed by reference through the deploy steps.
#[derive(Clone, Debug)]
pub struct NetworkParams {
    /// A human-readable network name
    pub name: &'static str,
    /// The chain id of the network
    pub chain_id: u64,
    /// Whether the network is a local dev node or a public testnet
    pub kind: NetworkKind,
    /// The key hash identifying the VRF job used for randomness requests
    pub key_hash: B256,
    /// The fee paid to the oracle per randomness request, in juels
    pub oracle_fee: U256,
    /// The base URL of the network's block explorer, if it has one
    pub explorer_base: Option<&'static str>,
}

impl NetworkParams {
    /// Look up the parameters for the given chain id.
    ///
    /// Fails with [`ScriptError::UnknownChain`] for chains without a table
    /// entry, before any transaction is signed or sent.
    pub fn for_chain(chain_id: u64) -> Result<Self, ScriptError> {
        match chain_id {
            LOCAL_CHAIN_ID => Ok(NetworkParams {
                name: "localhost",
                chain_id: LOCAL_CHAIN_ID,
                kind: NetworkKind::Local,
                key_hash: LOCAL_KEY_HASH,
                oracle_fee: U256::from(ORACLE_FEE_JUELS),
                explorer_base: None,
            }),
            MUMBAI_CHAIN_ID => Ok(NetworkParams {
                name: "mumbai",
                chain_id: MUMBAI_CHAIN_ID,
                kind: NetworkKind::Testnet {
                    link_token: MUMBAI_LINK_TOKEN,
                    vrf_coordinator: MUMBAI_VRF_COORDINATOR,
                },
                key_hash: MUMBAI_KEY_HASH,
                oracle_fee: U256::from(ORACLE_FEE_JUELS),
                explorer_base: Some(MUMBAI_EXPLORER_BASE),
            }),
            _ => Err(ScriptError::UnknownChain(chain_id)),
        }
    }

    /// Whether the network is a local dev node
    pub fn is_local(&self) -> bool {
        matches!(self.kind, NetworkKind::Local)
    }

    /// The explorer URL of the given address, if the network has an explorer
    pub fn explorer_url(&self, address: Address) -> Option<String> {
        self.explorer_base
            .map(|base| format!("{base}/address/{address:#x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_chains_complete() {
        for chain_id in SUPPORTED_CHAIN_IDS {
            let params = NetworkParams::for_chain(chain_id).unwrap();
            assert_eq!(params.chain_id, chain_id);
            assert_ne!(params.key_hash, B256::ZERO);
            assert!(params.oracle_fee > U256::ZERO);

            // Public network entries must carry live oracle addresses
            if let NetworkKind::Testnet {
                link_token,
                vrf_coordinator,
            } = params.kind
            {
                assert_ne!(link_token, Address::ZERO);
                assert_ne!(vrf_coordinator, Address::ZERO);
            }
        }
    }

    #[test]
    fn test_unknown_chain() {
        let err = NetworkParams::for_chain(1).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownChain(1)));
    }

    #[test]
    fn test_local_entry() {
        let params = NetworkParams::for_chain(LOCAL_CHAIN_ID).unwrap();
        assert!(params.is_local());
        assert!(matches!(params.kind, NetworkKind::Local));
        assert!(params.explorer_url(Address::ZERO).is_none());
    }

    #[test]
    fn test_mumbai_entry() {
        let params = NetworkParams::for_chain(MUMBAI_CHAIN_ID).unwrap();
        assert!(!params.is_local());
        assert_eq!(params.oracle_fee, U256::from(ORACLE_FEE_JUELS));

        match params.kind {
            NetworkKind::Testnet {
                link_token,
                vrf_coordinator,
            } => {
                assert_eq!(link_token, MUMBAI_LINK_TOKEN);
                assert_eq!(vrf_coordinator, MUMBAI_VRF_COORDINATOR);
            }
            NetworkKind::Local => panic!("mumbai resolved as a local chain"),
        }

        let url = params.explorer_url(MUMBAI_LINK_TOKEN).unwrap();
        assert!(url.starts_with(MUMBAI_EXPLORER_BASE));
    }
}
