//! Utilities for the deploy & upgrade scripts.

use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
    str::FromStr,
};

use alloy::{
    primitives::{utils::parse_units, Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    chain::AlloyDeployer,
    config::NetworkProfile,
    constants::{CHAIN_ID_KEY, DEPLOYMENTS_KEY, PRICE_DECIMALS},
    errors::ScriptError,
    types::DeploymentReport,
};

/// Sets up a signing client for the given network profile.
///
/// When the profile declares a chain ID, it is checked against the
/// endpoint before any transaction can be sent.
pub async fn setup_client(
    priv_key: &str,
    network: &NetworkProfile,
    artifacts: ArtifactStore,
) -> Result<AlloyDeployer, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let sender = signer.address();

    let url =
        Url::parse(&network.url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

    connect_deployer(DynProvider::new(provider), sender, network, artifacts).await
}

/// Wraps a provider in a deployer once its chain ID matches the network profile
pub async fn connect_deployer(
    provider: DynProvider,
    sender: Address,
    network: &NetworkProfile,
    artifacts: ArtifactStore,
) -> Result<AlloyDeployer, ScriptError> {
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    check_chain_id(network, chain_id)?;

    info!(
        "Connected to {} (chain {}) as {}",
        network.name, chain_id, sender
    );
    Ok(AlloyDeployer::new(provider, sender, artifacts))
}

/// Ask the network's endpoint for its chain ID, without a signer attached
pub async fn query_chain_id(network: &NetworkProfile) -> Result<u64, ScriptError> {
    let url =
        Url::parse(&network.url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    ProviderBuilder::new()
        .connect_http(url)
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
}

/// Check the chain ID reported by an endpoint against the network profile
pub fn check_chain_id(network: &NetworkProfile, actual: u64) -> Result<(), ScriptError> {
    match network.chain_id {
        Some(expected) if expected != actual => {
            Err(ScriptError::ChainIdMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

/// Parse a decimal price into its 18-decimal fixed point representation
pub fn parse_price(price: &str) -> Result<U256, ScriptError> {
    let parsed = parse_units(price, PRICE_DECIMALS)
        .map_err(|e| ScriptError::CalldataConstruction(format!("price `{}`: {}", price, e)))?;

    if parsed.is_negative() {
        return Err(ScriptError::CalldataConstruction(format!(
            "price `{}` is negative",
            price
        )));
    }

    Ok(parsed.get_absolute())
}

/// Parse a hex-encoded address
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address)
        .map_err(|e| ScriptError::CalldataConstruction(format!("address `{}`: {}", address, e)))
}

/// Run an external command, streaming its output, and fail if it exits unsuccessfully
pub fn run_command(mut cmd: Command) -> Result<(), ScriptError> {
    cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    let status = cmd
        .status()
        .map_err(|e| ScriptError::ToolInvocation(e.to_string()))?;

    if status.success() {
        Ok(())
    } else {
        Err(ScriptError::ToolInvocation(format!(
            "command failed with status: {}",
            status
        )))
    }
}

/// Record the addresses of a deployment run in a JSON manifest.
///
/// Entries already present under other labels are kept.
pub fn write_deployments(
    file_path: &Path,
    chain_id: u64,
    report: &DeploymentReport,
) -> Result<(), ScriptError> {
    let mut manifest = if file_path.exists() {
        let contents = fs::read_to_string(file_path)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        serde_json::from_str::<Value>(&contents)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?
    } else {
        Value::Object(Map::new())
    };

    let root = manifest.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments(format!("{} is not a JSON object", file_path.display()))
    })?;
    root.insert(CHAIN_ID_KEY.to_string(), Value::from(chain_id));

    let deployments = root
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!("`{}` is not a JSON object", DEPLOYMENTS_KEY))
        })?;

    for contract in &report.contracts {
        let entry =
            serde_json::to_value(contract).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        deployments.insert(contract.label.clone(), entry);
    }

    let contents = serde_json::to_string_pretty(&manifest)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{address, U64},
        transports::mock::Asserter,
    };

    use super::*;
    use crate::{chain::Deployer, types::DeployedContract};

    #[test]
    fn test_parse_price_scales_to_18_decimals() {
        let two = parse_price("2").unwrap();
        assert_eq!(two, U256::from(2u64) * U256::from(10u64).pow(U256::from(18u64)));

        let half = parse_price("0.5").unwrap();
        assert_eq!(half, U256::from(500_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_price_rejects_invalid() {
        assert!(parse_price("two").is_err());
        assert!(parse_price("-1").is_err());
    }

    #[test]
    fn test_check_chain_id() {
        let mut network = NetworkProfile {
            name: "polygon".to_string(),
            url: "https://polygon-bor-rpc.publicnode.com".to_string(),
            chain_id: Some(137),
            explorer: None,
        };
        assert!(check_chain_id(&network, 137).is_ok());
        assert!(matches!(
            check_chain_id(&network, 80002),
            Err(ScriptError::ChainIdMismatch {
                expected: 137,
                actual: 80002
            })
        ));

        // Profiles without a chain ID accept any endpoint
        network.chain_id = None;
        assert!(check_chain_id(&network, 11155111).is_ok());
    }

    #[tokio::test]
    async fn test_connect_deployer_checks_chain_id() {
        let network = NetworkProfile {
            name: "polygon".to_string(),
            url: "https://polygon-bor-rpc.publicnode.com".to_string(),
            chain_id: Some(137),
            explorer: None,
        };
        let sender = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        let asserter = Asserter::new();
        asserter.push_success(&U64::from(137u64));
        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let deployer = connect_deployer(
            DynProvider::new(provider),
            sender,
            &network,
            ArtifactStore::new("artifacts"),
        )
        .await
        .unwrap();
        assert_eq!(deployer.sender(), sender);

        let asserter = Asserter::new();
        asserter.push_success(&U64::from(80002u64));
        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let res = connect_deployer(
            DynProvider::new(provider),
            sender,
            &network,
            ArtifactStore::new("artifacts"),
        )
        .await;
        assert!(matches!(
            res,
            Err(ScriptError::ChainIdMismatch {
                expected: 137,
                actual: 80002
            })
        ));
    }

    #[test]
    fn test_write_deployments_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let usdc = address!("00000000000000000000000000000000000000aa");
        let router = address!("00000000000000000000000000000000000000bb");

        let first = DeploymentReport {
            contracts: vec![DeployedContract::direct("USDC", usdc)],
        };
        write_deployments(&path, 31337, &first).unwrap();

        let second = DeploymentReport {
            contracts: vec![DeployedContract::direct("MockRouter", router)],
        };
        write_deployments(&path, 31337, &second).unwrap();

        let manifest: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest[CHAIN_ID_KEY], 31337);
        let recorded = |label: &str| {
            manifest[DEPLOYMENTS_KEY][label]["address"]
                .as_str()
                .unwrap()
                .parse::<Address>()
                .unwrap()
        };
        assert_eq!(recorded("USDC"), usdc);
        assert_eq!(recorded("MockRouter"), router);
    }
}
