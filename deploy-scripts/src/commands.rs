//! Implementations of the various deploy scripts

use std::path::PathBuf;

use alloy_primitives::{keccak256, Address};
use alloy_sol_types::{SolCall, SolConstructor};
use tracing::{info, warn};

use crate::{
    artifacts::ContractArtifact,
    cli::{DeployMode, DeployTag, UpgradeArgs},
    constants::{
        CRYPTO_BOOKS_CONTRACT_KEY, CRYPTO_BOOKS_IMPL_CONTRACT_KEY, LINK_TOKEN_CONTRACT_KEY,
        PROXY_ADMIN_CONTRACT_KEY, PROXY_ADMIN_STORAGE_SLOT, PROXY_ARTIFACT_NAME,
        PROXY_IMPL_STORAGE_SLOT, PROXY_OWNER_ACCOUNT_INDEX, VRF_COORDINATOR_CONTRACT_KEY,
    },
    deployments::{DeploymentRecord, Deployments},
    errors::ScriptError,
    networks::{NetworkKind, NetworkParams},
    solidity::{CryptoBooks, ProxyAdmin, TransparentUpgradeableProxy, VRFCoordinatorMock},
    utils::{
        deploy_contract, dev_signer, is_live_contract, read_storage_address, GasReport, RpcClient,
    },
};

// -----------
// | Context |
// -----------

/// Shared state threaded through the deploy steps of a single run
pub struct DeployContext {
    /// The RPC client with the deployer's signer attached
    pub client: RpcClient,
    /// The address of the deployer account
    pub deployer: Address,
    /// The parameters of the target network
    pub params: NetworkParams,
    /// The directory holding compiled contract artifacts
    pub artifacts_dir: PathBuf,
    /// The deployment records for the target network
    pub deployments: Deployments,
    /// The per-contract gas usage report
    pub gas_report: GasReport,
    /// The explorer API key used for contract verification, if configured
    pub explorer_api_key: Option<String>,
}

// ------------------
// | Deploy scripts |
// ------------------

/// Run the deploy steps selected by the given tags.
///
/// Mocks always precede the main contract so that a local books deployment
/// can resolve the freshly recorded mock addresses.
pub async fn run_deploy(
    ctx: &mut DeployContext,
    tags: &[DeployTag],
    mode: DeployMode,
    proxy_owner: Option<Address>,
) -> Result<(), ScriptError> {
    info!(
        "deploying to {} (chain id {}) as {:#x}",
        ctx.params.name, ctx.params.chain_id, ctx.deployer,
    );

    if tags
        .iter()
        .any(|tag| matches!(tag, DeployTag::All | DeployTag::Mocks))
    {
        deploy_mocks(ctx).await?;
    }

    if tags
        .iter()
        .any(|tag| matches!(tag, DeployTag::All | DeployTag::Books))
    {
        deploy_books(ctx, mode, proxy_owner).await?;
    }

    ctx.gas_report.log_summary();

    Ok(())
}

/// Deploy the mock LINK token and VRF coordinator.
///
/// Only local chains get mocks; on public networks this step logs and
/// returns without touching the chain.
pub async fn deploy_mocks(ctx: &mut DeployContext) -> Result<(), ScriptError> {
    if !ctx.params.is_local() {
        info!(
            "{} is a public network, skipping mock deployment",
            ctx.params.name,
        );
        return Ok(());
    }

    // The LINK token first, the coordinator constructor needs its address
    let link_artifact = ContractArtifact::load(&ctx.artifacts_dir, LINK_TOKEN_CONTRACT_KEY)?;
    let link_address = deploy_if_needed(
        ctx,
        LINK_TOKEN_CONTRACT_KEY,
        link_artifact,
        Vec::new(), // constructor_args
    )
    .await?;

    let coordinator_artifact =
        ContractArtifact::load(&ctx.artifacts_dir, VRF_COORDINATOR_CONTRACT_KEY)?;
    let constructor_args = VRFCoordinatorMock::constructorCall { link: link_address }.abi_encode();
    deploy_if_needed(
        ctx,
        VRF_COORDINATOR_CONTRACT_KEY,
        coordinator_artifact,
        constructor_args,
    )
    .await?;

    Ok(())
}

/// Deploy the CryptoBooks contract in the given mode
pub async fn deploy_books(
    ctx: &mut DeployContext,
    mode: DeployMode,
    proxy_owner: Option<Address>,
) -> Result<(), ScriptError> {
    let (link_token, vrf_coordinator) = resolve_oracle_addresses(&ctx.params, &ctx.deployments)?;
    let artifact = ContractArtifact::load(&ctx.artifacts_dir, CRYPTO_BOOKS_CONTRACT_KEY)?;

    let books_address = match mode {
        DeployMode::Direct => {
            let constructor_args = CryptoBooks::constructorCall {
                vrfCoordinator: vrf_coordinator,
                linkToken: link_token,
                keyHash: ctx.params.key_hash,
                fee: ctx.params.oracle_fee,
            }
            .abi_encode();

            deploy_if_needed(ctx, CRYPTO_BOOKS_CONTRACT_KEY, artifact, constructor_args).await?
        }
        DeployMode::Proxy => {
            deploy_books_proxy(ctx, artifact, link_token, vrf_coordinator, proxy_owner).await?
        }
    };

    log_explorer_hint(ctx, books_address);

    Ok(())
}

/// Deploy the CryptoBooks implementation behind a transparent upgradeable
/// proxy, returning the proxy address.
///
/// The implementation is deployed without constructor arguments; its state
/// is set by the `initialize` calldata the proxy constructor executes.
async fn deploy_books_proxy(
    ctx: &mut DeployContext,
    impl_artifact: ContractArtifact,
    link_token: Address,
    vrf_coordinator: Address,
    proxy_owner: Option<Address>,
) -> Result<Address, ScriptError> {
    let impl_address = deploy_if_needed(
        ctx,
        CRYPTO_BOOKS_IMPL_CONTRACT_KEY,
        impl_artifact,
        Vec::new(), // constructor_args
    )
    .await?;

    // Reuse a live proxy rather than re-deploying it; its implementation
    // slot tells us whether an upgrade is pending
    let existing_proxy = ctx
        .deployments
        .get(CRYPTO_BOOKS_CONTRACT_KEY)
        .map(|record| record.address);
    if let Some(proxy_address) = existing_proxy {
        if is_live_contract(&ctx.client, proxy_address).await? {
            let live_impl =
                read_storage_address(&ctx.client, proxy_address, PROXY_IMPL_STORAGE_SLOT).await?;
            if live_impl == impl_address {
                info!("proxy already deployed at {proxy_address:#x}, reusing");
            } else {
                warn!(
                    "proxy at {proxy_address:#x} points at implementation {live_impl:#x}, \
                     not {impl_address:#x}; run the upgrade command as the proxy owner",
                );
            }
            return Ok(proxy_address);
        }
    }

    let owner = match proxy_owner {
        Some(owner) => owner,
        None if ctx.params.is_local() => dev_signer(PROXY_OWNER_ACCOUNT_INDEX)?.address(),
        None => {
            return Err(ScriptError::MissingParameter(
                "a proxy owner address is required on public networks".to_string(),
            ))
        }
    };
    if owner == ctx.deployer {
        warn!("proxy owner is the same account as the deployer");
    }

    let init_data = CryptoBooks::initializeCall {
        vrfCoordinator: vrf_coordinator,
        linkToken: link_token,
        keyHash: ctx.params.key_hash,
        fee: ctx.params.oracle_fee,
    }
    .abi_encode();

    let proxy_artifact = ContractArtifact::load(&ctx.artifacts_dir, PROXY_ARTIFACT_NAME)?;
    let constructor_args = TransparentUpgradeableProxy::constructorCall {
        logic: impl_address,
        initialOwner: owner,
        data: init_data.into(),
    }
    .abi_encode();

    let (proxy_address, receipt) =
        deploy_contract(&ctx.client, proxy_artifact.bytecode()?, constructor_args).await?;
    ctx.gas_report
        .record(CRYPTO_BOOKS_CONTRACT_KEY, receipt.gas_used);
    ctx.deployments.record(
        CRYPTO_BOOKS_CONTRACT_KEY,
        DeploymentRecord {
            address: proxy_address,
            tx_hash: receipt.transaction_hash,
            bytecode_hash: None,
        },
    )?;

    // Recover the admin contract the proxy constructor deployed.
    // This is the recommended way to get the proxy admin address:
    // https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106
    let admin_address =
        read_storage_address(&ctx.client, proxy_address, PROXY_ADMIN_STORAGE_SLOT).await?;
    ctx.deployments.record(
        PROXY_ADMIN_CONTRACT_KEY,
        DeploymentRecord {
            address: admin_address,
            tx_hash: receipt.transaction_hash,
            bytecode_hash: None,
        },
    )?;

    info!(
        "CryptoBooks proxy deployed at {proxy_address:#x} \
         (implementation {impl_address:#x}, admin {admin_address:#x}, owner {owner:#x})",
    );

    Ok(proxy_address)
}

/// Upgrade the CryptoBooks implementation behind the proxy.
///
/// Must be signed by the proxy owner; the admin contract rejects everyone
/// else.
pub async fn upgrade(client: &RpcClient, args: &UpgradeArgs) -> Result<(), ScriptError> {
    let proxy_admin = ProxyAdmin::new(args.proxy_admin, client.clone());

    let data = args.calldata.clone().unwrap_or_default();

    let receipt = proxy_admin
        .upgradeAndCall(args.proxy, args.implementation, data)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(
            "upgrade transaction reverted".to_string(),
        ));
    }

    info!(
        "proxy {:#x} upgraded to implementation {:#x}",
        args.proxy, args.implementation,
    );

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Resolve the LINK token and VRF coordinator addresses for the target
/// network.
///
/// Local chains read the mock addresses out of the deployment records;
/// public networks use the fixed addresses from the parameter table.
pub fn resolve_oracle_addresses(
    params: &NetworkParams,
    deployments: &Deployments,
) -> Result<(Address, Address), ScriptError> {
    match params.kind {
        NetworkKind::Testnet {
            link_token,
            vrf_coordinator,
        } => Ok((link_token, vrf_coordinator)),
        NetworkKind::Local => {
            let link_token = deployments
                .address_of(LINK_TOKEN_CONTRACT_KEY)
                .map_err(|_| missing_mocks_error())?;
            let vrf_coordinator = deployments
                .address_of(VRF_COORDINATOR_CONTRACT_KEY)
                .map_err(|_| missing_mocks_error())?;

            Ok((link_token, vrf_coordinator))
        }
    }
}

/// The error returned when a local books deployment cannot find the mock
/// records it depends on
fn missing_mocks_error() -> ScriptError {
    ScriptError::MissingParameter(
        "mock oracle contracts are not recorded for this chain, run the mocks step first"
            .to_string(),
    )
}

/// Deploy the given artifact unless its record already points at live code
/// deployed from the same bytecode
async fn deploy_if_needed(
    ctx: &mut DeployContext,
    name: &str,
    artifact: ContractArtifact,
    constructor_args: Vec<u8>,
) -> Result<Address, ScriptError> {
    let bytecode = artifact.bytecode()?;
    let code_hash = keccak256(&bytecode);

    let existing = ctx
        .deployments
        .get(name)
        .map(|record| (record.address, record.bytecode_hash));
    if let Some((address, stored_hash)) = existing {
        if stored_hash == Some(code_hash) && is_live_contract(&ctx.client, address).await? {
            info!("{name} already deployed at {address:#x}, reusing");
            return Ok(address);
        }
    }

    let (address, receipt) = deploy_contract(&ctx.client, bytecode, constructor_args).await?;
    ctx.gas_report.record(name, receipt.gas_used);
    ctx.deployments.record(
        name,
        DeploymentRecord {
            address,
            tx_hash: receipt.transaction_hash,
            bytecode_hash: Some(code_hash),
        },
    )?;

    info!("{name} deployed at {address:#x}");

    Ok(address)
}

/// Log where to find a freshly deployed contract on the network's explorer
/// and, when an API key is configured, the verification command to run
fn log_explorer_hint(ctx: &DeployContext, address: Address) {
    if let Some(url) = ctx.params.explorer_url(address) {
        info!("view the contract at {url}");

        if ctx.explorer_api_key.is_some() {
            info!(
                "verify with: forge verify-contract {address:#x} CryptoBooks \
                 --chain-id {} --etherscan-api-key $POLYGONSCAN_API_KEY",
                ctx.params.chain_id,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, TxHash};
    use tempdir::TempDir;

    use crate::{
        deployments::DeploymentRecord,
        networks::{LOCAL_CHAIN_ID, MUMBAI_CHAIN_ID},
    };

    use super::*;

    fn record_for(address: Address) -> DeploymentRecord {
        DeploymentRecord {
            address,
            tx_hash: TxHash::ZERO,
            bytecode_hash: None,
        }
    }

    #[test]
    fn test_resolve_oracle_addresses_local() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        let link = Address::from([0x11; 20]);
        let coordinator = Address::from([0x22; 20]);

        let mut deployments = Deployments::load(&path, LOCAL_CHAIN_ID).unwrap();
        deployments
            .record(LINK_TOKEN_CONTRACT_KEY, record_for(link))
            .unwrap();
        deployments
            .record(VRF_COORDINATOR_CONTRACT_KEY, record_for(coordinator))
            .unwrap();

        let params = NetworkParams::for_chain(LOCAL_CHAIN_ID).unwrap();
        let resolved = resolve_oracle_addresses(&params, &deployments).unwrap();
        assert_eq!(resolved, (link, coordinator));
    }

    #[test]
    fn test_resolve_oracle_addresses_local_missing_mocks() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");
        let deployments = Deployments::load(&path, LOCAL_CHAIN_ID).unwrap();

        let params = NetworkParams::for_chain(LOCAL_CHAIN_ID).unwrap();
        let err = resolve_oracle_addresses(&params, &deployments).unwrap_err();
        assert!(matches!(err, ScriptError::MissingParameter(_)));
    }

    #[test]
    fn test_resolve_oracle_addresses_testnet() {
        let dir = TempDir::new("deployments").unwrap();
        let path = dir.path().join("deployments.json");

        // An empty record store: public networks never consult it
        let deployments = Deployments::load(&path, MUMBAI_CHAIN_ID).unwrap();

        let params = NetworkParams::for_chain(MUMBAI_CHAIN_ID).unwrap();
        let (link_token, vrf_coordinator) =
            resolve_oracle_addresses(&params, &deployments).unwrap();

        match params.kind {
            NetworkKind::Testnet {
                link_token: expected_link,
                vrf_coordinator: expected_coordinator,
            } => {
                assert_eq!(link_token, expected_link);
                assert_eq!(vrf_coordinator, expected_coordinator);
            }
            NetworkKind::Local => panic!("mumbai resolved as a local chain"),
        }
    }
}
