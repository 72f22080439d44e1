//! Definitions of CLI arguments and commands for the deploy & upgrade scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    commands::{build, deploy, upgrade, verify},
    config::{Config, NetworkProfile},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_NETWORK, DEFAULT_TOKEN1_TO_USDC_PRICE,
        DEFAULT_UPGRADE_CONTRACT, DEFAULT_UPGRADE_PROXY, DEFAULT_USDC_TO_TOKEN1_PRICE,
    },
    errors::ScriptError,
    utils::{query_chain_id, setup_client, write_deployments},
};

/// Deploy and upgrade the aggregator contracts on an EVM network
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a network configuration file, replacing the built-in one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The name of the network profile to run against
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the mock tokens, router, position manager and the proxied
    /// wallet logic & aggregator manager
    Deploy(DeployArgs),
    /// Upgrade an existing proxy, OpenZeppelin v5 proxies only
    Upgrade(UpgradeArgs),
    /// Compile the contracts with the configured compiler settings
    Build,
    /// Verify a deployed contract on the network's block explorer
    Verify(VerifyArgs),
}

/// Everything a command needs besides its own arguments
pub struct Context {
    /// The loaded configuration
    pub config: Config,
    /// The selected network
    pub network: NetworkProfile,
    /// The deployer's private key, if one was given
    pub priv_key: Option<String>,
    /// The compiled contract artifacts
    pub artifacts: ArtifactStore,
}

impl Context {
    /// The private key, required by commands that sign transactions
    fn priv_key(&self) -> Result<&str, ScriptError> {
        self.priv_key
            .as_deref()
            .ok_or(ScriptError::MissingPrivateKey)
    }
}

impl Command {
    /// Run the command against the network in the given context
    pub async fn run(self, ctx: Context) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => {
                let deployer =
                    setup_client(ctx.priv_key()?, &ctx.network, ctx.artifacts.clone()).await?;
                let report = deploy(&args, &deployer).await?;
                print!("{}", report);

                if let Some(path) = &args.deployments {
                    let chain_id = query_chain_id(&ctx.network).await?;
                    write_deployments(path, chain_id, &report)?;
                    info!("Deployments written to {}", path.display());
                }
                Ok(())
            }
            Command::Upgrade(args) => {
                let deployer =
                    setup_client(ctx.priv_key()?, &ctx.network, ctx.artifacts.clone()).await?;
                let report = upgrade(&args, &deployer).await?;
                print!("{}", report);
                Ok(())
            }
            Command::Build => build(&ctx.config.compiler, &ctx.artifacts),
            Command::Verify(args) => {
                let chain_id = match ctx.network.chain_id {
                    Some(chain_id) => chain_id,
                    None => query_chain_id(&ctx.network).await?,
                };
                verify(&args, &ctx.config, &ctx.network, chain_id)
            }
        }
    }
}

/// Deploy the full set of contracts
#[derive(Args, Clone, Debug)]
pub struct DeployArgs {
    /// The router price of the mock stablecoin in units of the second token
    #[arg(long, default_value = DEFAULT_USDC_TO_TOKEN1_PRICE)]
    pub usdc_to_token1_price: String,

    /// The router price of the second token in units of the mock stablecoin
    #[arg(long, default_value = DEFAULT_TOKEN1_TO_USDC_PRICE)]
    pub token1_to_usdc_price: String,

    /// Also record the deployed addresses in this JSON file
    #[arg(short, long)]
    pub deployments: Option<PathBuf>,
}

impl Default for DeployArgs {
    fn default() -> Self {
        Self {
            usdc_to_token1_price: DEFAULT_USDC_TO_TOKEN1_PRICE.to_string(),
            token1_to_usdc_price: DEFAULT_TOKEN1_TO_USDC_PRICE.to_string(),
            deployments: None,
        }
    }
}

/// Upgrade a proxy to a new implementation, OpenZeppelin v5 proxies only.
///
/// The proxy must be a v5
/// `TransparentUpgradeableProxy` administered by a `ProxyAdmin` owned by the
/// deployer. A v4 admin forwards the empty upgrade calldata to the new
/// implementation, which reverts unless it has a fallback. The new
/// implementation is not checked for storage layout compatibility with the
/// old one.
#[derive(Args, Clone, Debug)]
pub struct UpgradeArgs {
    /// Address of the proxy contract
    #[arg(long, default_value = DEFAULT_UPGRADE_PROXY)]
    pub proxy: String,

    /// The contract to deploy as the new implementation
    #[arg(long, default_value = DEFAULT_UPGRADE_CONTRACT)]
    pub contract: String,
}

impl Default for UpgradeArgs {
    fn default() -> Self {
        Self {
            proxy: DEFAULT_UPGRADE_PROXY.to_string(),
            contract: DEFAULT_UPGRADE_CONTRACT.to_string(),
        }
    }
}

/// Verify a deployed contract
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Address of the deployed contract
    #[arg(long)]
    pub address: String,

    /// Name of the contract
    #[arg(long)]
    pub contract: String,

    /// ABI-encoded constructor arguments, in hex form
    #[arg(long)]
    pub constructor_args: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_parse_deploy_defaults() {
        let cli = Cli::try_parse_from(["aggregator-scripts", "--network", "testnet", "deploy"])
            .unwrap();
        assert_eq!(cli.network, "testnet");
        assert_eq!(cli.artifacts, PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        let Command::Deploy(args) = cli.command else {
            panic!("expected the deploy command");
        };
        assert_eq!(args.usdc_to_token1_price, "2");
        assert_eq!(args.token1_to_usdc_price, "0.5");
        assert!(args.deployments.is_none());
    }

    #[test]
    fn test_parse_upgrade_defaults() {
        let cli = Cli::try_parse_from(["aggregator-scripts", "-n", "polygon", "upgrade"]).unwrap();

        let Command::Upgrade(args) = cli.command else {
            panic!("expected the upgrade command");
        };
        assert_eq!(args.proxy, DEFAULT_UPGRADE_PROXY);
        assert_eq!(args.contract, "USDCVault");
    }

    #[test]
    fn test_upgrade_help_names_proxy_version() {
        let help = Cli::command()
            .find_subcommand_mut("upgrade")
            .unwrap()
            .render_help()
            .to_string();
        assert!(help.contains("OpenZeppelin v5 proxies only"));
    }

    #[test]
    fn test_verify_requires_address() {
        assert!(
            Cli::try_parse_from(["aggregator-scripts", "verify", "--contract", "MockRouter"])
                .is_err()
        );
    }
}
