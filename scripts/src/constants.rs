//! Constants used in the deploy & upgrade scripts

use alloy::primitives::{b256, B256};

/// The built-in network configuration, used when no config file is given
pub const DEFAULT_CONFIG: &str = include_str!("../networks.toml");

/// The network selected when none is given on the command line
pub const DEFAULT_NETWORK: &str = "localhost";

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The number of decimals used in fixed-point price encoding
pub const PRICE_DECIMALS: u8 = 18;

/// The default price of the mock stablecoin in units of the second mock token
pub const DEFAULT_USDC_TO_TOKEN1_PRICE: &str = "2";

/// The default price of the second mock token in units of the mock stablecoin
pub const DEFAULT_TOKEN1_TO_USDC_PRICE: &str = "0.5";

/// The address of the previously deployed vault proxy targeted by the upgrade command
pub const DEFAULT_UPGRADE_PROXY: &str = "0x5A0E898233fc15cFeA2995ddD0E62E5ce1d6a127";

// ------------------
// | Contract names |
// ------------------

/// The mock stablecoin contract
pub const MOCK_USDC_CONTRACT: &str = "MockUSDC";

/// The second mock token contract
pub const MOCK_TOKEN1_CONTRACT: &str = "MockToken1";

/// The mock Uniswap V3 position manager contract
pub const MOCK_NFT_MANAGER_CONTRACT: &str = "MockUniV3NFTManager";

/// The mock swap router contract
pub const MOCK_ROUTER_CONTRACT: &str = "MockRouter";

/// The wallet logic contract, deployed behind a proxy
pub const WALLET_LOGIC_CONTRACT: &str = "WalletLogic";

/// The aggregator manager contract, deployed behind a proxy
pub const AGGREGATOR_MANAGER_CONTRACT: &str = "AggregatorManager";

/// The vault contract whose new implementation the upgrade command deploys
pub const DEFAULT_UPGRADE_CONTRACT: &str = "USDCVault";

/// The OpenZeppelin v5 transparent proxy contract.
///
/// Its constructor deploys a `ProxyAdmin` owned by the `initialOwner` argument.
pub const TRANSPARENT_PROXY_CONTRACT: &str = "TransparentUpgradeableProxy";

// ------------------
// | ERC-1967 slots |
// ------------------

/// The storage slot containing the implementation address of an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The number of times a transaction receipt is polled for before giving up
pub const RECEIPT_POLL_ATTEMPTS: usize = 10;

/// The delay between polls for a transaction receipt, in milliseconds
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 100;

// -----------------------
// | Artifacts & tooling |
// -----------------------

/// The extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The name of the Foundry command
pub const FORGE_COMMAND: &str = "forge";

/// The name of the build command
pub const BUILD_COMMAND: &str = "build";

/// The name of the verification command
pub const VERIFY_COMMAND: &str = "verify-contract";

// -----------------------
// | Deployments manifest |
// -----------------------

/// The deployments key in the deployments manifest
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The chain ID key in the deployments manifest
pub const CHAIN_ID_KEY: &str = "chain_id";
