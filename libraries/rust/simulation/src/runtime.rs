//! In-memory ledger for exercising the provisioning flows without a cluster.
//!
//! The ledger keeps an account store and a complete, ordered log of every
//! instruction it processed, so tests can assert call counts and argument
//! sequences. Program semantics are pluggable: the system program is built in,
//! programs with no interesting state (token programs, compute budget) can be
//! registered as accepting no-ops, and anything else dispatches to a handler
//! the harness registers.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;

use solana_sdk::account::Account;
use solana_sdk::compute_budget;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction::SystemInstruction;
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};

use crate::solana_rpc_api::SolanaRpcClient;

pub type InstructionHandler = Box<dyn Fn(&mut AccountStore, &Instruction) -> Result<()> + Send + Sync>;

/// The ledger's mutable account state, handed to instruction handlers.
#[derive(Default, Clone)]
pub struct AccountStore {
    accounts: HashMap<Pubkey, Account>,
}

impl AccountStore {
    pub fn get(&self, address: &Pubkey) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// An address is in use once it holds lamports, data, or a non-system
    /// owner; creating over it must fail the way the cluster would.
    pub fn in_use(&self, address: &Pubkey) -> bool {
        self.accounts.get(address).map_or(false, |account| {
            account.lamports > 0 || !account.data.is_empty() || account.owner != system_program::ID
        })
    }

    pub fn create_account(
        &mut self,
        address: &Pubkey,
        lamports: u64,
        space: usize,
        owner: &Pubkey,
    ) -> Result<()> {
        if self.in_use(address) {
            bail!("account {address} already in use");
        }

        self.accounts.insert(
            *address,
            Account {
                lamports,
                data: vec![0; space],
                owner: *owner,
                executable: false,
                rent_epoch: 0,
            },
        );

        Ok(())
    }

    /// Rent-funded account creation for program handlers emulating anchor
    /// `init` semantics.
    pub fn create_program_account(
        &mut self,
        address: &Pubkey,
        space: usize,
        owner: &Pubkey,
    ) -> Result<()> {
        let lamports = Rent::default().minimum_balance(space);
        self.create_account(address, lamports, space, owner)
    }

    pub fn credit(&mut self, address: &Pubkey, lamports: u64) {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::new(0, 0, &system_program::ID));
        account.lamports += lamports;
    }

    fn debit(&mut self, address: &Pubkey, lamports: u64) -> Result<()> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or_else(|| anyhow!("debit from unknown account {address}"))?;
        if account.lamports < lamports {
            bail!("insufficient funds in {address}");
        }
        account.lamports -= lamports;

        Ok(())
    }
}

#[derive(Default)]
struct LedgerState {
    store: AccountStore,
    log: Vec<Instruction>,
    confirmed: HashSet<Signature>,
}

pub struct TestLedgerBuilder {
    handlers: HashMap<Pubkey, InstructionHandler>,
    builtins: HashSet<Pubkey>,
}

impl Default for TestLedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLedgerBuilder {
    pub fn new() -> Self {
        let mut builtins = HashSet::new();
        builtins.insert(compute_budget::ID);

        Self {
            handlers: HashMap::new(),
            builtins,
        }
    }

    /// Register instruction semantics for a program.
    pub fn program(mut self, id: Pubkey, handler: InstructionHandler) -> Self {
        self.handlers.insert(id, handler);
        self
    }

    /// Accept a program's instructions without modeling any state change.
    pub fn builtin(mut self, id: Pubkey) -> Self {
        self.builtins.insert(id);
        self
    }

    pub fn start(self) -> TestLedger {
        let payer = Keypair::new();
        let mut store = AccountStore::default();
        store.credit(&payer.pubkey(), 10_000 * LAMPORTS_PER_SOL);

        TestLedger {
            payer,
            handlers: self.handlers,
            builtins: self.builtins,
            state: Mutex::new(LedgerState {
                store,
                ..Default::default()
            }),
        }
    }
}

pub struct TestLedger {
    payer: Keypair,
    handlers: HashMap<Pubkey, InstructionHandler>,
    builtins: HashSet<Pubkey>,
    state: Mutex<LedgerState>,
}

impl TestLedger {
    pub fn builder() -> TestLedgerBuilder {
        TestLedgerBuilder::new()
    }

    /// Every instruction processed by a successful transaction, in order.
    pub fn instruction_log(&self) -> Vec<Instruction> {
        self.state.lock().log.clone()
    }

    fn process_transaction(&self, tx: &Transaction) -> Result<Signature> {
        let message = tx.message();
        let mut state = self.state.lock();
        let snapshot = state.store.clone();
        let mut processed = Vec::with_capacity(message.instructions.len());

        for compiled in &message.instructions {
            let program_id = *compiled.program_id(&message.account_keys);
            let accounts = compiled
                .accounts
                .iter()
                .map(|&index| {
                    let index = index as usize;
                    AccountMeta {
                        pubkey: message.account_keys[index],
                        is_signer: message.is_signer(index),
                        is_writable: message.is_writable(index),
                    }
                })
                .collect();
            let instruction = Instruction {
                program_id,
                accounts,
                data: compiled.data.clone(),
            };

            if let Err(error) = self.dispatch(&mut state.store, &instruction) {
                // transactions are atomic; roll the whole thing back
                state.store = snapshot;
                return Err(error.context(format!("transaction rejected by {program_id}")));
            }

            processed.push(instruction);
        }

        debug!("processed {} instructions", processed.len());
        state.log.append(&mut processed);
        let signature = tx.signatures.first().copied().unwrap_or_default();
        state.confirmed.insert(signature);

        Ok(signature)
    }

    fn dispatch(&self, store: &mut AccountStore, instruction: &Instruction) -> Result<()> {
        if instruction.program_id == system_program::ID {
            return process_system_instruction(store, instruction);
        }
        if self.builtins.contains(&instruction.program_id) {
            return Ok(());
        }
        match self.handlers.get(&instruction.program_id) {
            Some(handler) => handler(store, instruction),
            None => bail!(
                "no handler registered for program {}",
                instruction.program_id
            ),
        }
    }
}

fn process_system_instruction(store: &mut AccountStore, instruction: &Instruction) -> Result<()> {
    let decoded: SystemInstruction = bincode::deserialize(&instruction.data)?;

    match decoded {
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let funder = instruction.accounts[0].pubkey;
            let address = instruction.accounts[1].pubkey;
            if !instruction.accounts[1].is_signer {
                bail!("new account {address} must sign its own creation");
            }
            store.debit(&funder, lamports)?;
            store.create_account(&address, lamports, space as usize, &owner)
        }
        SystemInstruction::Transfer { lamports } => {
            let from = instruction.accounts[0].pubkey;
            let to = instruction.accounts[1].pubkey;
            store.debit(&from, lamports)?;
            store.credit(&to, lamports);
            Ok(())
        }
        other => bail!("system instruction {other:?} not supported by the test ledger"),
    }
}

#[async_trait]
impl SolanaRpcClient for TestLedger {
    fn as_any(&self) -> &dyn std::any::Any {
        self as &dyn std::any::Any
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self.state.lock().store.get(address).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        // unique per request so back-to-back identical transactions never
        // collide on their signature
        Ok(Hash::new_unique())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, length: usize) -> Result<u64> {
        Ok(Rent::default().minimum_balance(length))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.process_transaction(transaction)
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>> {
        let state = self.state.lock();

        Ok(signatures
            .iter()
            .map(|signature| {
                state
                    .confirmed
                    .contains(signature)
                    .then(|| TransactionStatus {
                        slot: 0,
                        confirmations: Some(1),
                        status: Ok(()),
                        err: None,
                        confirmation_status: Some(TransactionConfirmationStatus::Finalized),
                    })
            })
            .collect())
    }

    async fn airdrop(&self, account: &Pubkey, amount: u64) -> Result<()> {
        self.state.lock().store.credit(account, amount);

        Ok(())
    }

    fn payer(&self) -> &Keypair {
        &self.payer
    }
}
