//! Integration tests for the CryptoBooks deploy tooling.
//!
//! The harness assumes a local dev node (anvil) is already running. It
//! re-runs the deploy sequence as its fixture, funds the books contract
//! with LINK, and then executes every registered test case in sequence.

mod test_args;
mod test_inventory;
mod tests;
mod util;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use deploy_scripts::{
    cli::{DeployMode, DeployTag},
    commands::run_deploy,
};
use eyre::Result;
use test_args::TestArgs;
use test_inventory::IntegrationTest;
use tracing::info;

use crate::util::books::fund_one_fee;

/// The default private key for the tests, the first account an anvil node
/// is seeded with
const DEFAULT_PKEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The CLI arguments for the integration tests
#[derive(Debug, Clone, Parser)]
struct CliArgs {
    /// The path to the deployments file shared with the deploy scripts
    #[clap(long, default_value = "../deployments.json")]
    deployments: PathBuf,
    /// The directory containing compiled contract artifacts
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "../artifacts")]
    artifacts: PathBuf,
    /// The private key to use for testing
    #[clap(short = 'p', long, default_value = DEFAULT_PKEY)]
    pkey: String,
    /// The RPC url to run the tests against
    #[clap(short = 'r', long, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,
    /// Run only the tests whose name contains this string
    #[arg(short, long)]
    test: Option<String>,
}

// --------------
// | Entrypoint |
// --------------

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = CliArgs::parse();
    tracing_subscriber::fmt().pretty().init();

    let args = TestArgs::setup(&cli).await?;
    setup_fixture(&args).await?;

    run_all_tests(&cli, &args).await
}

/// Prepare the chain for the test cases.
///
/// Re-runs the full deploy sequence, which is idempotent against existing
/// records, then tops the books contract up with LINK for the first
/// request.
async fn setup_fixture(args: &TestArgs) -> Result<()> {
    info!(
        "running deploy fixture against {} (chain id {})",
        args.params.name, args.params.chain_id,
    );

    let mut ctx = args.deploy_context()?;
    run_deploy(&mut ctx, &[DeployTag::All], DeployMode::Proxy, None).await?;

    fund_one_fee(args).await?;
    Ok(())
}

/// Run every registered test case, printing one summary line per case.
///
/// A failing case does not stop its siblings; the process exits non-zero
/// if any case failed.
async fn run_all_tests(cli: &CliArgs, args: &TestArgs) -> Result<ExitCode> {
    let mut ran = 0usize;
    let mut failed = 0usize;

    for test in inventory::iter::<IntegrationTest> {
        if let Some(filter) = cli.test.as_deref() {
            if !test.name.contains(filter) {
                continue;
            }
        }

        ran += 1;
        match (test.test_fn)(args.clone()).await {
            Ok(()) => println!("{} ... {}", test.name, "PASS".green()),
            Err(report) => {
                failed += 1;
                println!("{} ... {}", test.name, "FAIL".red());
                println!("{report:?}");
            }
        }
    }

    if ran == 0 {
        eyre::bail!("no test matches the given filter");
    }

    println!("{} passed, {} failed", ran - failed, failed);
    let code = if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    Ok(code)
}
