//! Definitions of Solidity functions called during deployment & upgrades

#![allow(clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    /// Set a static exchange rate on the mock router, as an 18-decimal fixed point value
    function setPrice(address token_in, address token_out, uint256 price) external;

    /// Upgrade a transparent proxy, called on its `ProxyAdmin`
    function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
}

sol! {
    /// The wallet logic initializer
    interface IWalletLogic {
        function initialize(address owner, address admin) external;
    }
}

sol! {
    /// The aggregator manager initializer
    interface IAggregatorManager {
        function initialize(address usdc, address wallet_implementation, address nft_manager, address router) external;
    }
}
