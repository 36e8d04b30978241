use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use solana_transaction_status::TransactionStatus;

/// Represents some client interface to the Solana network.
#[async_trait]
pub trait SolanaRpcClient: Send + Sync {
    fn as_any(&self) -> &dyn std::any::Any;
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;
    async fn get_latest_blockhash(&self) -> Result<Hash>;
    async fn get_minimum_balance_for_rent_exemption(&self, length: usize) -> Result<u64>;
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;
    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>>;

    async fn airdrop(&self, account: &Pubkey, amount: u64) -> Result<()>;

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let signature = self.send_transaction(transaction).await?;
        let _ = self.confirm_transactions(&[signature]).await?;

        Ok(signature)
    }

    async fn confirm_transactions(&self, signatures: &[Signature]) -> Result<Vec<bool>> {
        for _ in 0..7 {
            let statuses = self.get_signature_statuses(signatures).await?;

            if statuses.iter().all(|s| s.is_some()) {
                return Ok(statuses
                    .into_iter()
                    .map(|s| s.unwrap().err.is_none())
                    .collect());
            }
        }

        bail!("failed to confirm signatures: {:?}", signatures);
    }

    fn payer(&self) -> &Keypair;
}

/// Live cluster connection for running the harness against localnet or devnet.
pub struct RpcConnection {
    rpc: Arc<RpcClient>,
    payer: Keypair,
    tx_config: Option<RpcSendTransactionConfig>,
}

impl RpcConnection {
    pub fn new(payer: Keypair, rpc: RpcClient) -> RpcConnection {
        RpcConnection {
            rpc: Arc::new(rpc),
            payer,
            tx_config: None,
        }
    }

    /// Optimistic = assume there is no risk. so we don't need:
    /// - finality (processed can be trusted)
    /// - preflight checks (not worried about losing sol)
    ///
    /// This is desirable for testing because:
    /// - tests can run faster (never need to wait for finality)
    /// - validator logs are more comprehensive (preflight checks obscure error logs)
    /// - there is nothing at stake in a local test validator
    pub fn new_optimistic(payer: Keypair, url: &str) -> RpcConnection {
        RpcConnection {
            rpc: Arc::new(RpcClient::new_with_commitment(
                url.to_owned(),
                CommitmentConfig {
                    commitment: CommitmentLevel::Processed,
                },
            )),
            payer,
            tx_config: Some(RpcSendTransactionConfig {
                skip_preflight: true,
                ..Default::default()
            }),
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.rpc
    }
}

#[async_trait]
impl SolanaRpcClient for RpcConnection {
    fn as_any(&self) -> &dyn std::any::Any {
        self as &dyn std::any::Any
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let commitment = self.rpc.commitment();
        let tx_config = self.tx_config.unwrap_or(RpcSendTransactionConfig {
            preflight_commitment: Some(commitment.commitment),
            ..Default::default()
        });

        Ok(self
            .rpc
            .send_and_confirm_transaction_with_spinner_and_config(
                transaction,
                commitment,
                tx_config,
            )
            .await?)
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self
            .rpc
            .get_multiple_accounts(&[*address])
            .await?
            .pop()
            .flatten())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, length: usize) -> Result<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(length)
            .await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        Ok(self.rpc.send_transaction(transaction).await?)
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>> {
        Ok(self.rpc.get_signature_statuses(signatures).await?.value)
    }

    async fn airdrop(&self, account: &Pubkey, amount: u64) -> Result<()> {
        self.rpc.request_airdrop(account, amount).await?;

        Ok(())
    }

    fn payer(&self) -> &Keypair {
        &self.payer
    }
}
