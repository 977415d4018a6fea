//! Contract bindings used during deployment and testing

use alloy::network::Ethereum;
use alloy_sol_types::sol;

use crate::utils::RpcClient;

sol! {
    /// The CryptoBooks contract, a randomness-backed book registry.
    ///
    /// The constructor and `initialize` take the same parameters; direct
    /// deployments use the former, proxy deployments encode the latter
    /// into the proxy constructor's calldata.
    #[sol(rpc)]
    contract CryptoBooks {
        constructor(address vrfCoordinator, address linkToken, bytes32 keyHash, uint256 fee);

        function initialize(address vrfCoordinator, address linkToken, bytes32 keyHash, uint256 fee) external;

        function requestNewRandomBook(string memory name, string memory authorName) external returns (bytes32);

        function requestToBookName(bytes32 requestId) external view returns (string memory);
        function requestToAuthorName(bytes32 requestId) external view returns (string memory);
        function requestToSender(bytes32 requestId) external view returns (address);

        function vrfCoordinator() external view returns (address);
        function linkToken() external view returns (address);

        #[derive(Debug)]
        event BookRequested(bytes32 indexed requestId, address indexed requester);
    }
}

sol! {
    /// The LINK token surface the scripts touch
    #[sol(rpc)]
    contract LinkToken {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

sol! {
    /// The mock VRF coordinator deployed on local chains
    #[sol(rpc)]
    contract VRFCoordinatorMock {
        constructor(address link);

        function callBackWithRandomness(bytes32 requestId, uint256 randomness, address consumerContract) external;

        #[derive(Debug)]
        event RandomnessRequest(address indexed sender, bytes32 indexed keyHash, uint256 indexed seed, uint256 fee);
    }
}

sol! {
    /// The [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy)
    /// fronting proxy-mode deployments.
    ///
    /// Its constructor deploys a `ProxyAdmin` owned by `initialOwner`;
    /// upgrade calls can only be made through that admin contract.
    #[sol(rpc)]
    contract TransparentUpgradeableProxy {
        constructor(address logic, address initialOwner, bytes memory data);
    }
}

sol! {
    /// The proxy admin contract deployed alongside the transparent proxy
    #[sol(rpc)]
    contract ProxyAdmin {
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
        function owner() external view returns (address);
    }
}

/// A CryptoBooks instance using the default generics
pub type CryptoBooksContract = CryptoBooks::CryptoBooksInstance<RpcClient, Ethereum>;

/// A LINK token instance using the default generics
pub type LinkTokenContract = LinkToken::LinkTokenInstance<RpcClient, Ethereum>;

/// A VRF coordinator instance using the default generics
pub type VrfCoordinatorContract = VRFCoordinatorMock::VRFCoordinatorMockInstance<RpcClient, Ethereum>;

/// A proxy admin instance using the default generics
pub type ProxyAdminContract = ProxyAdmin::ProxyAdminInstance<RpcClient, Ethereum>;

#[cfg(test)]
mod tests {
    use alloy_sol_types::{SolCall, SolConstructor, SolEvent};
    use alloy_primitives::{Address, B256, U256};

    use super::*;

    #[test]
    fn test_initialize_calldata_shape() {
        let calldata = CryptoBooks::initializeCall {
            vrfCoordinator: Address::ZERO,
            linkToken: Address::ZERO,
            keyHash: B256::ZERO,
            fee: U256::ZERO,
        }
        .abi_encode();

        // Selector plus four static words
        assert_eq!(calldata.len(), 4 + 4 * 32);
        assert_eq!(&calldata[..4], CryptoBooks::initializeCall::SELECTOR);
    }

    #[test]
    fn test_constructor_args_shape() {
        let args = CryptoBooks::constructorCall {
            vrfCoordinator: Address::ZERO,
            linkToken: Address::ZERO,
            keyHash: B256::ZERO,
            fee: U256::ZERO,
        }
        .abi_encode();

        // Constructor args are appended to creation code without a selector
        assert_eq!(args.len(), 4 * 32);
    }

    #[test]
    fn test_book_requested_signature() {
        assert_eq!(
            CryptoBooks::BookRequested::SIGNATURE,
            "BookRequested(bytes32,address)"
        );
    }
}
