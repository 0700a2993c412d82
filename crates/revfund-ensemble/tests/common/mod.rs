#![allow(dead_code)]

use async_trait::async_trait;
use ethers::signers::LocalWallet;
use ethers::types::{Address, TxHash, U256};
use parking_lot::Mutex;
use revfund_core::{Currency, Signer, TokenStandard, TxOptions};
use revfund_ensemble::{ClosedAccrual, ShardContract, ShardError, SharedShard};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const BLOCKS_PER_ACCRUAL: u64 = 100;

pub fn signer() -> LocalWallet {
    "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
        .parse()
        .unwrap()
}

pub fn token() -> Currency {
    Currency::new(Address::repeat_byte(0x11), U256::from(7))
}

/// In-memory shard. Accruals are numbered globally from `first_accrual` and
/// each covers `BLOCKS_PER_ACCRUAL` blocks from `first_block`.
#[derive(Default)]
pub struct FakeShard {
    address: Address,
    first_accrual: u64,
    accruals: Mutex<Vec<ClosedAccrual>>,
    claimable_per_accrual: u64,
    staged: Mutex<U256>,
    claimed: HashSet<u64>,
    fail_claims: bool,
    revert_status: bool,
    fail_withdrawals: bool,
    calls: Mutex<HashMap<&'static str, usize>>,
    pub claims: Mutex<Vec<(u64, u64)>>,
    pub withdrawals: Mutex<Vec<U256>>,
}

impl FakeShard {
    pub fn new(id: u8) -> Self {
        FakeShard {
            address: Address::repeat_byte(id),
            claimable_per_accrual: 1,
            ..Default::default()
        }
    }

    pub fn with_accruals(mut self, first_accrual: u64, first_block: u64, count: u64) -> Self {
        self.first_accrual = first_accrual;
        self.accruals = Mutex::new(
            (0..count)
                .map(|i| ClosedAccrual {
                    start_block: first_block + i * BLOCKS_PER_ACCRUAL,
                    end_block: first_block + (i + 1) * BLOCKS_PER_ACCRUAL - 1,
                    amount: U256::from(1_000),
                })
                .collect(),
        );
        self
    }

    pub fn with_claimable_per_accrual(mut self, amount: u64) -> Self {
        self.claimable_per_accrual = amount;
        self
    }

    pub fn with_staged(mut self, staged: u64) -> Self {
        self.staged = Mutex::new(U256::from(staged));
        self
    }

    pub fn with_claimed(mut self, accruals: &[u64]) -> Self {
        self.claimed = accruals.iter().copied().collect();
        self
    }

    /// Status checks revert regardless of the index.
    pub fn reverting_status(mut self) -> Self {
        self.revert_status = true;
        self
    }

    pub fn failing_claims(mut self) -> Self {
        self.fail_claims = true;
        self
    }

    pub fn failing_withdrawals(mut self) -> Self {
        self.fail_withdrawals = true;
        self
    }

    /// Close one more accrual on chain.
    pub fn close_accrual(&self) {
        let mut accruals = self.accruals.lock();
        let start_block = accruals.last().map_or(0, |a| a.end_block + 1);
        accruals.push(ClosedAccrual {
            start_block,
            end_block: start_block + BLOCKS_PER_ACCRUAL - 1,
            amount: U256::from(1_000),
        });
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().entry(method).or_insert(0) += 1;
    }

    fn hash(&self) -> TxHash {
        let n = self.claims.lock().len() + self.withdrawals.lock().len();
        let mut bytes = [0u8; 32];
        bytes[0] = self.address.0[0];
        bytes[31] = n as u8;
        TxHash::from(bytes)
    }
}

#[async_trait]
impl ShardContract for FakeShard {
    fn address(&self) -> Address {
        self.address
    }

    async fn closed_accruals_count(&self, _currency: &Currency) -> Result<u64, ShardError> {
        self.record("closed_accruals_count");
        Ok(self.accruals.lock().len() as u64)
    }

    async fn closed_accrual(
        &self,
        _currency: &Currency,
        index: u64,
    ) -> Result<ClosedAccrual, ShardError> {
        self.record("closed_accrual");
        index
            .checked_sub(self.first_accrual)
            .and_then(|local| self.accruals.lock().get(local as usize).copied())
            .ok_or_else(|| ShardError::CallException(format!("no accrual {}", index)))
    }

    async fn claimable_amount_by_accruals(
        &self,
        _claimant: Address,
        _currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
    ) -> Result<U256, ShardError> {
        self.record("claimable_amount_by_accruals");
        Ok(U256::from((end_accrual - start_accrual + 1) * self.claimable_per_accrual))
    }

    async fn claimable_amount_by_block_numbers(
        &self,
        _claimant: Address,
        _currency: &Currency,
        start_block: u64,
        end_block: u64,
    ) -> Result<U256, ShardError> {
        self.record("claimable_amount_by_block_numbers");
        Ok(U256::from(end_block - start_block + 1))
    }

    async fn fully_claimed(
        &self,
        _claimant: Address,
        _currency: &Currency,
        accrual: u64,
    ) -> Result<bool, ShardError> {
        self.record("fully_claimed");
        let closed = self.accruals.lock().len() as u64;
        let local = accrual.checked_sub(self.first_accrual);
        if self.revert_status || local.map_or(true, |local| local >= closed) {
            return Err(ShardError::CallException("accrual index out of bounds".into()));
        }
        Ok(self.claimed.contains(&accrual))
    }

    async fn staged_balance(
        &self,
        _claimant: Address,
        _currency: &Currency,
    ) -> Result<U256, ShardError> {
        self.record("staged_balance");
        tokio::task::yield_now().await;
        Ok(*self.staged.lock())
    }

    async fn claim_and_stage_by_accruals(
        &self,
        _signer: &Signer,
        _currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
        _options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        self.record("claim_and_stage_by_accruals");
        if self.fail_claims {
            return Err(ShardError::Transport("replacement transaction underpriced".into()));
        }
        self.claims.lock().push((start_accrual, end_accrual));
        Ok(self.hash())
    }

    async fn claim_and_stage_by_block_numbers(
        &self,
        _signer: &Signer,
        _currency: &Currency,
        start_block: u64,
        end_block: u64,
        _options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        self.record("claim_and_stage_by_block_numbers");
        if self.fail_claims {
            return Err(ShardError::Transport("replacement transaction underpriced".into()));
        }
        self.claims.lock().push((start_block, end_block));
        Ok(self.hash())
    }

    async fn withdraw(
        &self,
        _signer: &Signer,
        amount: U256,
        _currency: &Currency,
        _standard: TokenStandard,
        _options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        self.record("withdraw");
        tokio::task::yield_now().await;
        if self.fail_withdrawals {
            return Err(ShardError::CallException("execution reverted".into()));
        }
        {
            let mut staged = self.staged.lock();
            *staged = staged
                .checked_sub(amount)
                .ok_or_else(|| ShardError::CallException("execution reverted".into()))?;
        }
        self.withdrawals.lock().push(amount);
        Ok(self.hash())
    }
}

/// Shards laid out back to back from `offset`, blocks starting at 1000.
pub fn contiguous(offset: u64, counts: &[u64]) -> Vec<Arc<FakeShard>> {
    let mut accrual = offset;
    let mut block = 1_000;
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let shard = FakeShard::new(i as u8 + 1).with_accruals(accrual, block, *count);
            accrual += count;
            block += count * BLOCKS_PER_ACCRUAL;
            Arc::new(shard)
        })
        .collect()
}

pub fn shared(shards: &[Arc<FakeShard>]) -> Vec<SharedShard> {
    shards.iter().map(|shard| shard.clone() as SharedShard).collect()
}
