//! Defines the arguments passed to each integration test

use std::path::PathBuf;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, U256};
use deploy_scripts::{
    commands::DeployContext,
    constants::{
        CRYPTO_BOOKS_CONTRACT_KEY, LINK_TOKEN_CONTRACT_KEY, VRF_COORDINATOR_CONTRACT_KEY,
    },
    deployments::Deployments,
    networks::NetworkParams,
    solidity::{
        CryptoBooks, CryptoBooksContract, LinkToken, LinkTokenContract, VRFCoordinatorMock,
        VrfCoordinatorContract,
    },
    utils::{fetch_chain_id, parse_priv_key, setup_client, GasReport, RpcClient},
};
use eyre::{ensure, Result};

use crate::{util::transactions::call_helper, CliArgs};

/// The arguments provided to each integration test
#[derive(Clone)]
pub struct TestArgs {
    /// The RPC url the tests run against
    pub rpc_url: String,
    /// The path of the deployments file written by the deploy scripts
    pub deployments_path: PathBuf,
    /// The directory containing compiled contract artifacts
    pub artifacts_dir: PathBuf,
    /// The parameters of the network under test
    pub params: NetworkParams,
    /// The signer the fixture deploys and requests with
    pub signer: PrivateKeySigner,
    /// The RPC client with the fixture signer attached
    pub client: RpcClient,
}

impl TestArgs {
    /// Connect to the configured node and resolve the network under test.
    ///
    /// Refuses anything but a local dev chain: the fixture redeploys
    /// contracts and mints funds, neither of which belongs on a public
    /// network.
    pub async fn setup(cli: &CliArgs) -> Result<Self> {
        let chain_id = fetch_chain_id(&cli.rpc_url).await?;
        let params = NetworkParams::for_chain(chain_id)?;
        ensure!(
            params.is_local(),
            "the integration tests only run against a local dev chain, {} is {}",
            cli.rpc_url,
            params.name,
        );

        let signer = parse_priv_key(&cli.pkey)?;
        let client = setup_client(signer.clone(), &cli.rpc_url)?;

        Ok(Self {
            rpc_url: cli.rpc_url.clone(),
            deployments_path: cli.deployments.clone(),
            artifacts_dir: cli.artifacts.clone(),
            params,
            signer,
            client,
        })
    }

    /// The address of the fixture signer
    pub fn wallet_addr(&self) -> Address {
        self.signer.address()
    }

    /// Load the deployment records written by the deploy scripts
    pub fn deployments(&self) -> Result<Deployments> {
        let deployments = Deployments::load(&self.deployments_path, self.params.chain_id)?;
        Ok(deployments)
    }

    /// A deploy context for running deploy steps from inside the harness
    pub fn deploy_context(&self) -> Result<DeployContext> {
        let deployments = self.deployments()?;
        Ok(DeployContext {
            client: self.client.clone(),
            deployer: self.wallet_addr(),
            params: self.params.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
            deployments,
            gas_report: GasReport::new(false),
            explorer_api_key: None,
        })
    }

    // --- Addresses and Contracts --- //

    /// The recorded address of the books contract (the proxy, in proxy
    /// deployments)
    pub fn books_addr(&self) -> Result<Address> {
        let addr = self.deployments()?.address_of(CRYPTO_BOOKS_CONTRACT_KEY)?;
        Ok(addr)
    }

    /// A books instance bound to the fixture signer
    pub fn books(&self) -> Result<CryptoBooksContract> {
        let addr = self.books_addr()?;
        Ok(CryptoBooks::new(addr, self.client.clone()))
    }

    /// The recorded address of the mock LINK token
    pub fn link_addr(&self) -> Result<Address> {
        let addr = self.deployments()?.address_of(LINK_TOKEN_CONTRACT_KEY)?;
        Ok(addr)
    }

    /// A LINK token instance bound to the fixture signer
    pub fn link_token(&self) -> Result<LinkTokenContract> {
        let addr = self.link_addr()?;
        Ok(LinkToken::new(addr, self.client.clone()))
    }

    /// The recorded address of the mock VRF coordinator
    pub fn coordinator_addr(&self) -> Result<Address> {
        let addr = self
            .deployments()?
            .address_of(VRF_COORDINATOR_CONTRACT_KEY)?;
        Ok(addr)
    }

    /// A VRF coordinator instance bound to the fixture signer
    pub fn coordinator(&self) -> Result<VrfCoordinatorContract> {
        let addr = self.coordinator_addr()?;
        Ok(VRFCoordinatorMock::new(addr, self.client.clone()))
    }

    // --- Balances --- //

    /// The LINK balance of the given address
    pub async fn link_balance(&self, addr: Address) -> Result<U256> {
        let link = self.link_token()?;
        let balance = call_helper(link.balanceOf(addr)).await?;
        Ok(balance)
    }
}
