//! The on-chain operations the scripts are built from.
//!
//! Every operation waits for its transaction to be included before
//! returning, so callers observe a strictly sequential order of effects.

use std::time::Duration;

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    artifacts::ArtifactStore,
    constants::{RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL_MS},
    errors::ScriptError,
};

/// A signing account able to deploy and call contracts on one network
#[allow(async_fn_in_trait)]
pub trait Deployer {
    /// The address of the signing account
    fn sender(&self) -> Address;

    /// Deploy the named contract with the given ABI-encoded constructor
    /// arguments, returning its address once the deployment is included
    async fn deploy_contract(
        &self,
        contract: &str,
        constructor_args: Bytes,
    ) -> Result<Address, ScriptError>;

    /// Send a state-changing call, returning its hash once it is included
    async fn send_call(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError>;

    /// Read a storage slot of the given contract
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError>;
}

/// A [`Deployer`] backed by an alloy provider with a local wallet
pub struct AlloyDeployer {
    /// The provider, with the signer's wallet attached
    provider: DynProvider<Ethereum>,
    /// The address of the signer
    sender: Address,
    /// Where contract bytecode is read from
    artifacts: ArtifactStore,
}

impl AlloyDeployer {
    /// Create a deployer from a wallet-enabled provider
    pub fn new(provider: DynProvider<Ethereum>, sender: Address, artifacts: ArtifactStore) -> Self {
        Self {
            provider,
            sender,
            artifacts,
        }
    }

    /// Send a transaction and wait for its receipt
    async fn send_and_confirm(
        &self,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ScriptError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!("sent transaction {}", tx_hash);

        // Poll for the receipt directly, watching the pending transaction can
        // miss the block it lands in
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }

            sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
        }

        Err(ScriptError::ContractInteraction(format!(
            "no receipt for transaction {}",
            tx_hash
        )))
    }
}

impl Deployer for AlloyDeployer {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy_contract(
        &self,
        contract: &str,
        constructor_args: Bytes,
    ) -> Result<Address, ScriptError> {
        let artifact = self.artifacts.load(contract)?;
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(artifact.deploy_code(&constructor_args));

        info!("Deploying {}...", contract);
        let receipt = self
            .send_and_confirm(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", contract, e)))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{}: transaction {} reverted",
                contract, receipt.transaction_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("{}: receipt has no contract address", contract))
        })?;
        info!("{} deployed at {}", contract, address);

        Ok(address)
    }

    async fn send_call(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        let receipt = self.send_and_confirm(tx).await?;
        if !receipt.status() {
            return Err(ScriptError::ContractInteraction(format!(
                "call to {} reverted in transaction {}",
                to, receipt.transaction_hash
            )));
        }

        Ok(receipt.transaction_hash)
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(B256::from(value.to_be_bytes::<32>()))
    }
}
