//! Helpers for OpenZeppelin v5 transparent upgradeable proxies.
//!
//! Calls made directly to a `TransparentUpgradeableProxy` are forwarded to its
//! implementation contract. Upgrades can only be made through the `ProxyAdmin`
//! contract the proxy deploys in its constructor, whose address is recorded in
//! the ERC-1967 admin slot.

use alloy::{
    primitives::{Address, Bytes},
    sol_types::{SolCall, SolValue},
};
use tracing::info;

use crate::{
    chain::Deployer,
    constants::{
        PROXY_ADMIN_STORAGE_SLOT, PROXY_IMPLEMENTATION_STORAGE_SLOT, TRANSPARENT_PROXY_CONTRACT,
    },
    errors::ScriptError,
    solidity::upgradeAndCallCall,
    types::ProxyDeployment,
};

/// Read the implementation address of an ERC-1967 proxy
pub async fn implementation_address(
    deployer: &impl Deployer,
    proxy: Address,
) -> Result<Address, ScriptError> {
    let word = deployer
        .storage_at(proxy, PROXY_IMPLEMENTATION_STORAGE_SLOT)
        .await?;
    Ok(Address::from_word(word))
}

/// Read the proxy admin address of an ERC-1967 proxy.
///
/// This is the recommended way to get the proxy admin address:
/// https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106
pub async fn admin_address(
    deployer: &impl Deployer,
    proxy: Address,
) -> Result<Address, ScriptError> {
    let word = deployer.storage_at(proxy, PROXY_ADMIN_STORAGE_SLOT).await?;
    Ok(Address::from_word(word))
}

/// Deploy the named contract behind a new transparent proxy.
///
/// The proxy calls the implementation with `init_calldata` in its constructor,
/// and the `ProxyAdmin` it creates is owned by the deployer.
pub async fn deploy_proxy(
    deployer: &impl Deployer,
    contract: &str,
    init_calldata: Vec<u8>,
) -> Result<ProxyDeployment, ScriptError> {
    let implementation = deployer.deploy_contract(contract, Bytes::new()).await?;

    let constructor_args = (
        implementation,
        deployer.sender(),
        Bytes::from(init_calldata),
    )
        .abi_encode_params();
    let proxy = deployer
        .deploy_contract(TRANSPARENT_PROXY_CONTRACT, constructor_args.into())
        .await?;

    let deployment = read_proxy(deployer, proxy).await?;
    if deployment.implementation != implementation {
        return Err(ScriptError::ContractDeployment(format!(
            "proxy {} points at {}, expected {}",
            proxy, deployment.implementation, implementation
        )));
    }

    info!(
        "{} proxy deployed at {} (implementation {}, admin {})",
        contract, deployment.proxy, deployment.implementation, deployment.admin
    );
    Ok(deployment)
}

/// Point an existing transparent proxy at a freshly deployed implementation
/// of the named contract.
///
/// No storage layout compatibility check is made between the old and new
/// implementations.
pub async fn upgrade_proxy(
    deployer: &impl Deployer,
    proxy: Address,
    contract: &str,
) -> Result<ProxyDeployment, ScriptError> {
    let admin = admin_address(deployer, proxy).await?;
    if admin == Address::ZERO {
        return Err(ScriptError::NotAProxy(proxy));
    }
    let previous = implementation_address(deployer, proxy).await?;
    info!("Upgrading proxy {} (current implementation {})", proxy, previous);

    let implementation = deployer.deploy_contract(contract, Bytes::new()).await?;

    let calldata = upgradeAndCallCall {
        proxy,
        implementation,
        data: Bytes::new(),
    }
    .abi_encode();
    deployer.send_call(admin, calldata.into()).await?;

    let deployment = read_proxy(deployer, proxy).await?;
    if deployment.implementation != implementation {
        return Err(ScriptError::ContractInteraction(format!(
            "proxy {} still points at {} after upgrade",
            proxy, deployment.implementation
        )));
    }

    Ok(deployment)
}

/// Read back the implementation and admin of a proxy
async fn read_proxy(
    deployer: &impl Deployer,
    proxy: Address,
) -> Result<ProxyDeployment, ScriptError> {
    Ok(ProxyDeployment {
        proxy,
        implementation: implementation_address(deployer, proxy).await?,
        admin: admin_address(deployer, proxy).await?,
    })
}
