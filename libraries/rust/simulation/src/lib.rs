//! Ledger access for the exchange provisioning harness.
//!
//! Everything that talks to a cluster goes through the [`SolanaRpcClient`]
//! trait so the same provisioning code runs against a live RPC endpoint
//! ([`RpcConnection`]) or the in-memory [`TestLedger`].

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::rngs::mock::StepRng;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

pub mod runtime;
pub mod solana_rpc_api;

pub use runtime::{AccountStore, InstructionHandler, TestLedger, TestLedgerBuilder};
pub use solana_rpc_api::{RpcConnection, SolanaRpcClient};

pub async fn send_and_confirm(
    rpc: &Arc<dyn SolanaRpcClient>,
    instructions: &[solana_sdk::instruction::Instruction],
    signers: &[&Keypair],
) -> Result<solana_sdk::signature::Signature, anyhow::Error> {
    let blockhash = rpc.get_latest_blockhash().await?;
    let mut signing_keypairs = vec![rpc.payer()];
    signing_keypairs.extend(signers.iter().map(|k| &**k));

    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&rpc.payer().pubkey()),
        &signing_keypairs,
        blockhash,
    );

    rpc.send_and_confirm_transaction(&tx).await
}

/// Generate a new wallet keypair with some initial funding
pub async fn create_wallet(
    rpc: &Arc<dyn SolanaRpcClient>,
    wallet: Keypair,
    lamports: u64,
) -> Result<Keypair, anyhow::Error> {
    let blockhash = rpc.get_latest_blockhash().await?;
    let payer = rpc.payer();

    let tx = solana_sdk::system_transaction::create_account(
        payer,
        &wallet,
        blockhash,
        lamports,
        0,
        &solana_sdk::system_program::ID,
    );

    rpc.send_and_confirm_transaction(&tx).await?;

    Ok(wallet)
}

/// Deterministic keypair source, so simulated runs are reproducible.
pub fn generate_keypair() -> Keypair {
    lazy_static! {
        static ref MOCK_RNG: Mutex<MockRng> = Mutex::new(MockRng(StepRng::new(1, 1)));
    }

    Keypair::generate(&mut *MOCK_RNG.lock())
}

struct MockRng(StepRng);

impl rand::CryptoRng for MockRng {}

impl rand::RngCore for MockRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
