//! Definitions of errors that can occur during the execution of the deploy & upgrade scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy::primitives::Address;

/// Errors that can occur during the execution of the deploy & upgrade scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or parsing the network configuration
    ConfigLoad(String),
    /// The requested network is not present in the configuration
    UnknownNetwork(String),
    /// No private key was supplied for a command that signs transactions
    MissingPrivateKey,
    /// No block explorer API key is configured for the network
    MissingExplorerKey(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// The RPC endpoint reports a different chain than the one configured
    ChainIdMismatch {
        /// The chain ID in the network profile
        expected: u64,
        /// The chain ID reported by the endpoint
        actual: u64,
    },
    /// No compilation artifact exists for the requested contract
    ArtifactNotFound(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// The given address has no proxy admin in its ERC-1967 admin slot
    NotAProxy(Address),
    /// Error writing the deployments manifest
    WriteDeployments(String),
    /// An external tool (`forge`) failed
    ToolInvocation(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ConfigLoad(s) => write!(f, "error loading config: {}", s),
            ScriptError::UnknownNetwork(s) => write!(f, "network `{}` is not configured", s),
            ScriptError::MissingPrivateKey => write!(f, "no private key provided"),
            ScriptError::MissingExplorerKey(s) => {
                write!(f, "no block explorer API key for network `{}`", s)
            }
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ChainIdMismatch { expected, actual } => write!(
                f,
                "chain id mismatch: configured {}, endpoint reports {}",
                expected, actual
            ),
            ScriptError::ArtifactNotFound(s) => write!(f, "no artifact found for contract {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::NotAProxy(addr) => {
                write!(f, "{} is not a transparent upgradeable proxy", addr)
            }
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ToolInvocation(s) => write!(f, "error running external tool: {}", s),
        }
    }
}

impl Error for ScriptError {}
