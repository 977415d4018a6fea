//! Definitions of CLI arguments and commands for the deploy scripts

use std::path::PathBuf;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, Bytes};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    commands::{run_deploy, upgrade, DeployContext},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_RPC_URL, DEPLOYER_ACCOUNT_INDEX,
        PROXY_OWNER_ACCOUNT_INDEX,
    },
    deployments::Deployments,
    errors::ScriptError,
    networks::NetworkParams,
    utils::{dev_signer, dev_signers, fetch_chain_id, parse_priv_key, setup_client, GasReport},
};

// -------
// | CLI |
// -------

/// Deploy the CryptoBooks contracts and their mock oracle dependencies
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer.
    ///
    /// Required on public networks; local dev chains fall back to the first
    /// dev account when unset.
    #[arg(short, long, env = "PRIVATE_KEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path of the deployments file for the target network
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Directory containing the compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Collect and log per-contract deployment gas usage
    #[arg(long, env = "REPORT_GAS")]
    pub report_gas: bool,

    /// Block explorer API key, used to log a verification command after
    /// testnet deployments
    #[arg(long, env = "POLYGONSCAN_API_KEY")]
    pub explorer_api_key: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The subcommands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Run the deploy steps selected by tag against the target network
    Deploy(DeployArgs),
    /// Upgrade the CryptoBooks implementation behind its proxy
    Upgrade(UpgradeArgs),
    /// Print the address of every configured signing account
    Accounts,
}

impl Cli {
    /// Run the parsed command
    pub async fn run(self) -> Result<(), ScriptError> {
        let Cli {
            priv_key,
            rpc_url,
            deployments_path,
            artifacts_dir,
            report_gas,
            explorer_api_key,
            command,
        } = self;

        match command {
            Command::Deploy(args) => {
                // Resolve the network before touching any signing key so an
                // unknown chain fails before a transaction can be built
                let chain_id = fetch_chain_id(&rpc_url).await?;
                let params = NetworkParams::for_chain(chain_id)?;

                let signer = resolve_deployer(priv_key.as_deref(), &params)?;
                let deployer = signer.address();
                let client = setup_client(signer, &rpc_url)?;
                let deployments = Deployments::load(&deployments_path, chain_id)?;

                let mut ctx = DeployContext {
                    client,
                    deployer,
                    params,
                    artifacts_dir,
                    deployments,
                    gas_report: GasReport::new(report_gas),
                    explorer_api_key,
                };

                run_deploy(&mut ctx, &args.tags, args.mode, args.proxy_owner).await
            }
            Command::Upgrade(args) => {
                let chain_id = fetch_chain_id(&rpc_url).await?;
                let params = NetworkParams::for_chain(chain_id)?;

                // Upgrades must be signed by the proxy owner, which locally
                // defaults to the second dev account
                let signer = match priv_key.as_deref() {
                    Some(key) => parse_priv_key(key)?,
                    None if params.is_local() => dev_signer(PROXY_OWNER_ACCOUNT_INDEX)?,
                    None => {
                        return Err(ScriptError::MissingParameter(
                            "PRIVATE_KEY is required to upgrade on public networks".to_string(),
                        ))
                    }
                };
                let client = setup_client(signer, &rpc_url)?;

                upgrade(&client, &args).await
            }
            Command::Accounts => {
                let signers = match priv_key.as_deref() {
                    Some(key) => vec![parse_priv_key(key)?],
                    None => dev_signers()?,
                };

                for signer in signers {
                    println!("{}", signer.address());
                }

                Ok(())
            }
        }
    }
}

// -------------------
// | Subcommand args |
// -------------------

/// The deploy steps selectable by tag
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeployTag {
    /// Run every deploy step
    All,
    /// Deploy the mock oracle contracts (local chains only)
    Mocks,
    /// Deploy the CryptoBooks contract
    Books,
}

/// How the CryptoBooks contract is deployed
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeployMode {
    /// A plain constructor deployment
    Direct,
    /// A deployment behind a transparent upgradeable proxy
    Proxy,
}

/// Run the deploy sequence.
///
/// Steps are selected by tag; the mock step always runs before the books
/// step so a local books deployment can resolve the mock addresses.
#[derive(Args)]
pub struct DeployArgs {
    /// The deploy steps to run
    #[arg(short, long, value_delimiter = ',', default_value = "all")]
    pub tags: Vec<DeployTag>,

    /// How the CryptoBooks contract is deployed
    #[arg(short, long, value_enum, default_value_t = DeployMode::Proxy)]
    pub mode: DeployMode,

    /// Address of the proxy owner.
    ///
    /// Required on public networks in proxy mode; local chains default to
    /// the second dev account.
    #[arg(long)]
    pub proxy_owner: Option<Address>,
}

/// Upgrade the CryptoBooks implementation.
///
/// The upgrade call goes through the `ProxyAdmin` contract and must be
/// signed by the proxy owner.
#[derive(Args)]
pub struct UpgradeArgs {
    /// Address of the proxy admin contract
    #[arg(long)]
    pub proxy_admin: Address,

    /// Address of the proxy contract
    #[arg(long)]
    pub proxy: Address,

    /// Address of the new implementation contract
    #[arg(short, long)]
    pub implementation: Address,

    /// Optional calldata, in hex form, with which to call the new
    /// implementation contract when upgrading
    #[arg(short, long)]
    pub calldata: Option<Bytes>,
}

// -----------
// | Helpers |
// -----------

/// Resolve the deployer's signing key.
///
/// Public networks require an explicit private key; local chains default
/// to the first dev account, matching what local nodes are seeded with.
fn resolve_deployer(
    priv_key: Option<&str>,
    params: &NetworkParams,
) -> Result<PrivateKeySigner, ScriptError> {
    match priv_key {
        Some(key) => parse_priv_key(key),
        None if params.is_local() => dev_signer(DEPLOYER_ACCOUNT_INDEX),
        None => Err(ScriptError::MissingParameter(
            "PRIVATE_KEY is required on public networks".to_string(),
        )),
    }
}
