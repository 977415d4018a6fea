//! Utilities for the deploy scripts.

use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder};
use std::str::FromStr;
use tracing::info;

use crate::{
    constants::{DEV_MNEMONIC, NUM_DEV_ACCOUNTS},
    errors::ScriptError,
};

/// The provider type used by the deploy scripts
pub type RpcClient = DynProvider<Ethereum>;

// ----------------
// | Client setup |
// ----------------

/// Fetch the chain id reported by the given RPC endpoint.
///
/// Uses a read-only provider so the chain can be identified before any
/// signing key is required.
pub async fn fetch_chain_id(rpc_url: &str) -> Result<u64, ScriptError> {
    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().connect_http(url);

    provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Set up a client for the given RPC endpoint with the given signer
/// attached
pub fn setup_client(signer: PrivateKeySigner, rpc_url: &str) -> Result<RpcClient, ScriptError> {
    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);

    Ok(DynProvider::new(provider))
}

/// Parse a signer from a hex-encoded private key
pub fn parse_priv_key(key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(key).map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Derive the dev account at the given index from the well-known mnemonic
/// local nodes are seeded with
pub fn dev_signer(index: u32) -> Result<PrivateKeySigner, ScriptError> {
    MnemonicBuilder::<English>::default()
        .phrase(DEV_MNEMONIC)
        .index(index)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?
        .build()
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Derive all dev accounts a local node is seeded with
pub fn dev_signers() -> Result<Vec<PrivateKeySigner>, ScriptError> {
    (0..NUM_DEV_ACCOUNTS).map(dev_signer).collect()
}

// --------------
// | Deployment |
// --------------

/// Deploy a contract from its creation bytecode and ABI-encoded
/// constructor arguments, returning the deployed address and the receipt.
pub async fn deploy_contract(
    client: &RpcClient,
    bytecode: Bytes,
    constructor_args: Vec<u8>,
) -> Result<(Address, TransactionReceipt), ScriptError> {
    let mut deploy_code = bytecode.to_vec();
    deploy_code.extend_from_slice(&constructor_args);

    let mut tx =
        TransactionRequest::default().input(TransactionInput::both(Bytes::from(deploy_code)));
    tx.to = Some(TxKind::Create);

    let pending = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "deploy transaction {:#x} reverted",
            receipt.transaction_hash,
        )));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment("no contract address in receipt".to_string())
    })?;

    Ok((address, receipt))
}

/// Whether the given address currently holds contract code
pub async fn is_live_contract(client: &RpcClient, address: Address) -> Result<bool, ScriptError> {
    let code = client
        .get_code_at(address)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(!code.is_empty())
}

/// Read an address out of the given storage slot of a contract.
///
/// Used to recover the EIP1967 admin and implementation addresses from an
/// upgradeable proxy.
pub async fn read_storage_address(
    client: &RpcClient,
    contract: Address,
    slot: B256,
) -> Result<Address, ScriptError> {
    let word = client
        .get_storage_at(contract, U256::from_be_bytes(slot.0))
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(Address::from_word(B256::from(word)))
}

// ------------------
// | Gas accounting |
// ------------------

/// A per-contract record of deployment gas usage
#[derive(Debug, Default)]
pub struct GasReport {
    /// Whether gas usage is being collected
    enabled: bool,
    /// The collected (label, gas used) entries, in deployment order
    entries: Vec<(String, u64)>,
}

impl GasReport {
    /// Create a report that collects entries only when enabled
    pub fn new(enabled: bool) -> Self {
        GasReport {
            enabled,
            entries: Vec::new(),
        }
    }

    /// Record the gas used by a deployment transaction
    pub fn record(&mut self, label: &str, gas_used: u64) {
        if self.enabled {
            self.entries.push((label.to_string(), gas_used));
        }
    }

    /// Log the collected entries and their total
    pub fn log_summary(&self) {
        if !self.enabled || self.entries.is_empty() {
            return;
        }

        let mut total = 0u64;
        for (label, gas) in &self.entries {
            info!("{label} deployment used {gas} gas");
            total += gas;
        }
        info!("total deployment gas: {total}");
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_dev_signer_derivation() {
        // The first two accounts every anvil / hardhat node is seeded with
        let deployer = dev_signer(0).unwrap();
        assert_eq!(
            deployer.address(),
            Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );

        let proxy_owner = dev_signer(1).unwrap();
        assert_eq!(
            proxy_owner.address(),
            Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
        );
    }

    #[test]
    fn test_dev_signers_count() {
        let signers = dev_signers().unwrap();
        assert_eq!(signers.len(), NUM_DEV_ACCOUNTS as usize);
    }

    #[test]
    fn test_parse_priv_key() {
        // The private key of dev account #0, as anvil prints it at boot
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let signer = parse_priv_key(key).unwrap();
        assert_eq!(signer.address(), dev_signer(0).unwrap().address());

        assert!(parse_priv_key("not-a-key").is_err());
    }

    #[test]
    fn test_gas_report_disabled() {
        let mut report = GasReport::new(false);
        report.record("CryptoBooks", 1_000_000);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_gas_report_enabled() {
        let mut report = GasReport::new(true);
        report.record("LinkToken", 500_000);
        report.record("VRFCoordinatorMock", 700_000);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0], ("LinkToken".to_string(), 500_000));
    }
}
