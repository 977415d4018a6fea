//! Helpers for funding the books contract and deploying scratch instances

use std::{fs, path::PathBuf};

use alloy::{
    primitives::utils::parse_ether, providers::ext::AnvilApi, signers::local::PrivateKeySigner,
};
use alloy_primitives::{Address, U256};
use deploy_scripts::{
    cli::DeployMode,
    commands::deploy_books,
    constants::{
        CRYPTO_BOOKS_CONTRACT_KEY, LINK_TOKEN_CONTRACT_KEY, VRF_COORDINATOR_CONTRACT_KEY,
    },
    deployments::Deployments,
    solidity::{CryptoBooks, CryptoBooksContract},
    utils::{setup_client, RpcClient},
};
use eyre::{eyre, Result};

use crate::{test_args::TestArgs, util::transactions::wait_for_tx_success};

/// The ETH balance given to freshly created signers
const FRESH_SIGNER_ETH: &str = "10";

// -----------
// | Funding |
// -----------

/// Transfer the given amount of LINK from the test wallet to the given
/// address
pub async fn fund_with_link(args: &TestArgs, to: Address, amount: U256) -> Result<()> {
    let link = args.link_token()?;
    wait_for_tx_success(link.transfer(to, amount)).await?;
    Ok(())
}

/// Top the books contract up to one oracle fee of LINK.
///
/// Each test funds the request it makes, so the cases stay independent of
/// the order the inventory yields them in.
pub async fn fund_one_fee(args: &TestArgs) -> Result<()> {
    let fee = args.params.oracle_fee;
    let balance = args.link_balance(args.books_addr()?).await?;
    if balance < fee {
        fund_with_link(args, args.books_addr()?, fee - balance).await?;
    }

    Ok(())
}

/// Create a fresh random signer, fund it with ETH, and return a client
/// bound to it
pub async fn fresh_funded_signer(args: &TestArgs) -> Result<(PrivateKeySigner, RpcClient)> {
    let signer = PrivateKeySigner::random();
    let bal = parse_ether(FRESH_SIGNER_ETH)?;
    args.client.anvil_set_balance(signer.address(), bal).await?;

    let client = setup_client(signer.clone(), &args.rpc_url)?;
    Ok((signer, client))
}

// -------------------
// | Scratch deploys |
// -------------------

/// The path of the scratch deployments file used by tests that deploy
/// their own books instance.
///
/// Kept separate from the fixture's file so scratch deploys never disturb
/// the records the other cases read.
pub fn scratch_deployments_path(args: &TestArgs) -> PathBuf {
    args.deployments_path.with_extension("scratch.json")
}

/// Deploy a fresh direct-mode books contract against a scratch record
/// store, reusing the fixture's mock oracle records.
///
/// The returned instance starts with a zero LINK balance.
pub async fn deploy_books_direct_scratch(args: &TestArgs) -> Result<CryptoBooksContract> {
    let scratch_path = scratch_deployments_path(args);
    if scratch_path.exists() {
        fs::remove_file(&scratch_path)?;
    }

    // Seed the scratch store with the fixture's mock records so the books
    // constructor resolves the same oracle contracts
    let fixture = args.deployments()?;
    let mut scratch = Deployments::load(&scratch_path, args.params.chain_id)?;
    for key in [LINK_TOKEN_CONTRACT_KEY, VRF_COORDINATOR_CONTRACT_KEY] {
        let record = fixture
            .get(key)
            .ok_or_else(|| eyre!("no {key} record in the fixture deployments"))?
            .clone();
        scratch.record(key, record)?;
    }

    let mut ctx = args.deploy_context()?;
    ctx.deployments = scratch;
    deploy_books(&mut ctx, DeployMode::Direct, None).await?;

    let addr = ctx.deployments.address_of(CRYPTO_BOOKS_CONTRACT_KEY)?;
    Ok(CryptoBooks::new(addr, args.client.clone()))
}
