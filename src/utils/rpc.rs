//! The ledger RPC surface the launch pipeline depends on.

use async_trait::async_trait;
use log::debug;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::errors::Result;

/// What the ledger currently says about a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not yet visible at the requested commitment.
    Pending,
    Confirmed,
    /// Landed but the ledger rejected it; carries the ledger's message.
    Failed(String),
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn minimum_rent_exempt_balance(&self, data_len: usize) -> Result<u64>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    async fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    async fn confirmation_status(&self, signature: &Signature) -> Result<ConfirmationStatus>;
}

#[async_trait]
impl ChainRpc for RpcClient {
    async fn minimum_rent_exempt_balance(&self, data_len: usize) -> Result<u64> {
        let lamports = self.get_minimum_balance_for_rent_exemption(data_len).await?;
        debug!("Rent exemption for {} bytes: {} lamports", data_len, lamports);
        Ok(lamports)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.get_latest_blockhash().await?)
    }

    async fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        Ok(self.send_transaction(transaction).await?)
    }

    async fn confirmation_status(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        let status = self
            .get_signature_status_with_commitment(signature, self.commitment())
            .await?;
        Ok(match status {
            None => ConfirmationStatus::Pending,
            Some(Ok(())) => ConfirmationStatus::Confirmed,
            Some(Err(err)) => ConfirmationStatus::Failed(err.to_string()),
        })
    }
}
