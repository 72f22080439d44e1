//! Implementations of the various scripts

use std::process::Command;

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    chain::Deployer,
    cli::{DeployArgs, UpgradeArgs, VerifyArgs},
    config::{CompilerSettings, Config, NetworkProfile},
    constants::{
        AGGREGATOR_MANAGER_CONTRACT, BUILD_COMMAND, FORGE_COMMAND, MOCK_NFT_MANAGER_CONTRACT,
        MOCK_ROUTER_CONTRACT, MOCK_TOKEN1_CONTRACT, MOCK_USDC_CONTRACT, VERIFY_COMMAND,
        WALLET_LOGIC_CONTRACT,
    },
    errors::ScriptError,
    proxy::{deploy_proxy, upgrade_proxy},
    solidity::{setPriceCall, IAggregatorManager, IWalletLogic},
    types::{DeployedContract, DeploymentReport, UpgradeReport},
    utils::{parse_address, parse_price, run_command},
};

/// Deploy the mock tokens, position manager and router, configure the
/// router's prices, then deploy the wallet logic and aggregator manager
/// behind proxies.
///
/// Each step is awaited before the next begins, since later steps consume
/// the addresses of earlier ones. A failure leaves whatever was already
/// deployed in place.
pub async fn deploy(
    args: &DeployArgs,
    deployer: &impl Deployer,
) -> Result<DeploymentReport, ScriptError> {
    // Parse the prices up front so a typo fails before anything is deployed
    let usdc_to_token1 = parse_price(&args.usdc_to_token1_price)?;
    let token1_to_usdc = parse_price(&args.token1_to_usdc_price)?;
    let admin = deployer.sender();

    // Deploy tokens
    let usdc = deployer
        .deploy_contract(MOCK_USDC_CONTRACT, Bytes::new())
        .await?;
    let token1 = deployer
        .deploy_contract(MOCK_TOKEN1_CONTRACT, Bytes::new())
        .await?;

    // Deploy the position manager & router
    let nft_manager = deployer
        .deploy_contract(MOCK_NFT_MANAGER_CONTRACT, Bytes::new())
        .await?;
    let router = deployer
        .deploy_contract(MOCK_ROUTER_CONTRACT, Bytes::new())
        .await?;

    // Set router prices in both directions
    set_price(deployer, router, usdc, token1, usdc_to_token1).await?;
    set_price(deployer, router, token1, usdc, token1_to_usdc).await?;

    // Deploy the wallet logic behind a proxy, administered by the deployer
    let wallet_init = IWalletLogic::initializeCall {
        owner: admin,
        admin,
    }
    .abi_encode();
    let wallet_logic = deploy_proxy(deployer, WALLET_LOGIC_CONTRACT, wallet_init).await?;

    // Deploy the aggregator manager behind a proxy. It is handed the wallet
    // logic implementation, not its proxy.
    let aggregator_init = IAggregatorManager::initializeCall {
        usdc,
        wallet_implementation: wallet_logic.implementation,
        nft_manager,
        router,
    }
    .abi_encode();
    let aggregator_manager =
        deploy_proxy(deployer, AGGREGATOR_MANAGER_CONTRACT, aggregator_init).await?;

    Ok(DeploymentReport {
        contracts: vec![
            DeployedContract::direct("USDC", usdc),
            DeployedContract::direct("Token1", token1),
            DeployedContract::direct(MOCK_NFT_MANAGER_CONTRACT, nft_manager),
            DeployedContract::direct(MOCK_ROUTER_CONTRACT, router),
            DeployedContract::proxied(WALLET_LOGIC_CONTRACT, &wallet_logic),
            DeployedContract::proxied(AGGREGATOR_MANAGER_CONTRACT, &aggregator_manager),
        ],
    })
}

/// Set the static exchange rate from `token_in` to `token_out` on the mock router
async fn set_price(
    deployer: &impl Deployer,
    router: Address,
    token_in: Address,
    token_out: Address,
    price: U256,
) -> Result<(), ScriptError> {
    let calldata = setPriceCall {
        token_in,
        token_out,
        price,
    }
    .abi_encode();

    let tx_hash = deployer.send_call(router, calldata.into()).await?;
    info!(
        "Router price {} -> {} set to {} in {}",
        token_in, token_out, price, tx_hash
    );
    Ok(())
}

/// Deploy a new implementation of a contract and point an existing proxy at it
pub async fn upgrade(
    args: &UpgradeArgs,
    deployer: &impl Deployer,
) -> Result<UpgradeReport, ScriptError> {
    let proxy = parse_address(&args.proxy)?;
    let deployment = upgrade_proxy(deployer, proxy, &args.contract).await?;

    Ok(UpgradeReport {
        contract: args.contract.clone(),
        proxy,
        implementation: deployment.implementation,
    })
}

/// Compile the contracts with the configured compiler settings, writing
/// artifacts into the artifacts directory.
///
/// Assumes that `forge` is locally available.
pub fn build(compiler: &CompilerSettings, artifacts: &ArtifactStore) -> Result<(), ScriptError> {
    let cmd = build_command(compiler, artifacts);
    info!("Compiling contracts with solc {}", compiler.version);
    run_command(cmd)
}

/// Assemble the `forge build` invocation for the given compiler settings
pub fn build_command(compiler: &CompilerSettings, artifacts: &ArtifactStore) -> Command {
    let mut cmd = Command::new(FORGE_COMMAND);
    cmd.arg(BUILD_COMMAND);
    cmd.arg("--use").arg(&compiler.version);
    if compiler.optimizer {
        cmd.arg("--optimize");
        cmd.arg("--optimizer-runs")
            .arg(compiler.optimizer_runs.to_string());
    }
    if compiler.via_ir {
        cmd.arg("--via-ir");
    }
    cmd.arg("--out").arg(artifacts.root());
    cmd
}

/// Submit a deployed contract's source for verification on the network's
/// block explorer.
///
/// Assumes that `forge` is locally available.
pub fn verify(
    args: &VerifyArgs,
    config: &Config,
    network: &NetworkProfile,
    chain_id: u64,
) -> Result<(), ScriptError> {
    let cmd = verify_command(args, config, network, chain_id)?;
    info!(
        "Verifying {} at {} on {}",
        args.contract, args.address, network.name
    );
    run_command(cmd)
}

/// Assemble the `forge verify-contract` invocation for a deployed contract
pub fn verify_command(
    args: &VerifyArgs,
    config: &Config,
    network: &NetworkProfile,
    chain_id: u64,
) -> Result<Command, ScriptError> {
    let address = parse_address(&args.address)?;
    let explorer = config.explorer(network)?;
    let api_key = config.explorer_api_key(network)?;

    let mut cmd = Command::new(FORGE_COMMAND);
    cmd.arg(VERIFY_COMMAND);
    cmd.arg(address.to_string());
    cmd.arg(&args.contract);
    cmd.arg("--chain").arg(chain_id.to_string());
    cmd.arg("--etherscan-api-key").arg(api_key);
    if let Some(url) = &explorer.api_url {
        cmd.arg("--verifier-url").arg(url);
    }
    if let Some(constructor_args) = &args.constructor_args {
        cmd.arg("--constructor-args").arg(constructor_args);
    }
    cmd.arg("--watch");

    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use std::{env, ffi::OsStr};

    use super::*;

    fn args_of(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    #[test]
    fn test_build_command_uses_compiler_settings() {
        let compiler = Config::builtin().unwrap().compiler;
        let cmd = build_command(&compiler, &ArtifactStore::new("artifacts"));

        assert_eq!(cmd.get_program(), FORGE_COMMAND);
        assert_eq!(
            args_of(&cmd),
            vec![
                "build",
                "--use",
                "0.8.28",
                "--optimize",
                "--optimizer-runs",
                "200",
                "--via-ir",
                "--out",
                "artifacts"
            ]
        );
    }

    #[test]
    fn test_build_command_without_optimizer() {
        let compiler = CompilerSettings {
            version: "0.8.24".to_string(),
            optimizer: false,
            optimizer_runs: 200,
            via_ir: false,
        };
        let cmd = build_command(&compiler, &ArtifactStore::new("out"));
        assert_eq!(args_of(&cmd), vec!["build", "--use", "0.8.24", "--out", "out"]);
    }

    #[test]
    fn test_verify_command() {
        let config = Config::builtin().unwrap();
        let polygon = config.network("polygon").unwrap();
        env::set_var("POLYGONSCAN_API_KEY", "polygonscan-key");

        let args = VerifyArgs {
            address: "0x00000000000000000000000000000000000000aa".to_string(),
            contract: "MockRouter".to_string(),
            constructor_args: None,
        };
        let cmd = verify_command(&args, &config, polygon, 137).unwrap();
        let cmd_args = args_of(&cmd);

        assert_eq!(cmd_args[0], VERIFY_COMMAND);
        assert_eq!(cmd_args[2], "MockRouter");
        assert!(cmd_args.windows(2).any(|w| w == ["--chain", "137"]));
        assert!(cmd_args
            .windows(2)
            .any(|w| w == ["--etherscan-api-key", "polygonscan-key"]));
    }

    #[test]
    fn test_verify_requires_explorer() {
        let config = Config::builtin().unwrap();
        let localhost = config.network("localhost").unwrap();
        let args = VerifyArgs {
            address: "0x00000000000000000000000000000000000000aa".to_string(),
            contract: "MockRouter".to_string(),
            constructor_args: None,
        };

        assert!(matches!(
            verify_command(&args, &config, localhost, 31337),
            Err(ScriptError::MissingExplorerKey(_))
        ));
    }
}
