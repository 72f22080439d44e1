//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::Address;
use serde::Serialize;

/// The addresses produced by deploying a contract behind a transparent proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProxyDeployment {
    /// The proxy, i.e. the externally visible address
    pub proxy: Address,
    /// The implementation the proxy forwards to
    pub implementation: Address,
    /// The `ProxyAdmin` contract created by the proxy
    pub admin: Address,
}

/// A contract deployed during a run of the scripts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    /// The label under which the contract is reported
    pub label: String,
    /// The address callers interact with
    pub address: Address,
    /// The implementation address, for contracts deployed behind a proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
}

impl DeployedContract {
    /// A contract deployed directly
    pub fn direct(label: &str, address: Address) -> Self {
        Self {
            label: label.to_string(),
            address,
            implementation: None,
        }
    }

    /// A contract deployed behind a proxy
    pub fn proxied(label: &str, deployment: &ProxyDeployment) -> Self {
        Self {
            label: format!("{} (Proxy)", label),
            address: deployment.proxy,
            implementation: Some(deployment.implementation),
        }
    }
}

impl Display for DeployedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.address)
    }
}

/// The outcome of the deploy command, in deployment order
#[derive(Clone, Debug, Default, Serialize)]
pub struct DeploymentReport {
    /// The deployed contracts
    pub contracts: Vec<DeployedContract>,
}

impl DeploymentReport {
    /// Look up a deployed contract by label
    pub fn get(&self, label: &str) -> Option<&DeployedContract> {
        self.contracts.iter().find(|c| c.label == label)
    }
}

impl Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for contract in &self.contracts {
            writeln!(f, "{}", contract)?;
        }
        Ok(())
    }
}

/// The outcome of the upgrade command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeReport {
    /// The upgraded contract
    pub contract: String,
    /// The proxy, unchanged by the upgrade
    pub proxy: Address,
    /// The implementation the proxy now forwards to
    pub implementation: Address,
}

impl Display for UpgradeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} upgraded at proxy address: {}",
            self.contract, self.proxy
        )?;
        writeln!(f, "Implementation address: {}", self.implementation)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_proxied_label() {
        let deployment = ProxyDeployment {
            proxy: address!("00000000000000000000000000000000000000aa"),
            implementation: address!("00000000000000000000000000000000000000bb"),
            admin: address!("00000000000000000000000000000000000000cc"),
        };
        let contract = DeployedContract::proxied("WalletLogic", &deployment);

        assert_eq!(contract.label, "WalletLogic (Proxy)");
        assert_eq!(contract.address, deployment.proxy);
        assert_eq!(contract.implementation, Some(deployment.implementation));
        assert_eq!(
            contract.to_string(),
            format!("WalletLogic (Proxy): {}", deployment.proxy)
        );
    }

    #[test]
    fn test_upgrade_report_display() {
        let proxy = address!("5A0E898233fc15cFeA2995ddD0E62E5ce1d6a127");
        let implementation = address!("00000000000000000000000000000000000000bb");
        let report = UpgradeReport {
            contract: "USDCVault".to_string(),
            proxy,
            implementation,
        };

        let output = report.to_string();
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                format!("USDCVault upgraded at proxy address: {}", proxy),
                format!("Implementation address: {}", implementation),
            ]
        );
    }
}
