//! Constants used in the deploy scripts

use alloy_primitives::{b256, B256};

/// The mock LINK token contract key in the deployments file
pub const LINK_TOKEN_CONTRACT_KEY: &str = "LinkToken";

/// The mock VRF coordinator contract key in the deployments file
pub const VRF_COORDINATOR_CONTRACT_KEY: &str = "VRFCoordinatorMock";

/// The CryptoBooks contract key in the deployments file.
///
/// In proxy deployments this is the proxy address, which is the address
/// user calls are made against.
pub const CRYPTO_BOOKS_CONTRACT_KEY: &str = "CryptoBooks";

/// The CryptoBooks implementation contract key in the deployments file
pub const CRYPTO_BOOKS_IMPL_CONTRACT_KEY: &str = "CryptoBooks_Implementation";

/// The proxy admin contract key in the deployments file
pub const PROXY_ADMIN_CONTRACT_KEY: &str = "CryptoBooks_ProxyAdmin";

/// The artifact name of the transparent upgradeable proxy contract.
///
/// Compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const PROXY_ARTIFACT_NAME: &str = "TransparentUpgradeableProxy";

/// The storage slot containing the proxy admin contract address in the
/// upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The storage slot containing the implementation contract address in the
/// upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPL_STORAGE_SLOT: B256 =
    b256!("0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The mnemonic from which local dev nodes derive their pre-funded accounts
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// The number of pre-funded accounts seeded by a local dev node
pub const NUM_DEV_ACCOUNTS: u32 = 10;

/// The index of the dev account used as the default deployer on local chains
pub const DEPLOYER_ACCOUNT_INDEX: u32 = 0;

/// The index of the dev account used as the default proxy owner on local
/// chains.
///
/// Kept distinct from the deployer account so that the transparent proxy's
/// admin checks never shadow user calls made by the deployer.
pub const PROXY_OWNER_ACCOUNT_INDEX: u32 = 1;

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default RPC URL, pointing at a local dev node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
