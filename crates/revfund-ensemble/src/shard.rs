//! The capability set every fund shard exposes.
//!
//! The ensemble only sees shards through [`ShardContract`], so it is agnostic
//! to how many contract versions exist or how a binding talks to the chain.

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use revfund_core::{Currency, Signer, TokenStandard, TxOptions};
use std::sync::Arc;

use crate::error::ShardError;

/// One closed accrual as recorded by a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClosedAccrual {
    pub start_block: u64,
    pub end_block: u64,
    pub amount: U256,
}

/// Binding to one deployed revenue fund contract.
///
/// Every call is scoped to a single shard and a single currency. Accrual
/// indices are global across the ensemble.
#[async_trait]
pub trait ShardContract: Send + Sync {
    /// Address of the deployed contract.
    fn address(&self) -> Address;

    async fn closed_accruals_count(&self, currency: &Currency) -> Result<u64, ShardError>;

    async fn closed_accrual(
        &self,
        currency: &Currency,
        index: u64,
    ) -> Result<ClosedAccrual, ShardError>;

    async fn claimable_amount_by_accruals(
        &self,
        claimant: Address,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
    ) -> Result<U256, ShardError>;

    async fn claimable_amount_by_block_numbers(
        &self,
        claimant: Address,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
    ) -> Result<U256, ShardError>;

    async fn fully_claimed(
        &self,
        claimant: Address,
        currency: &Currency,
        accrual: u64,
    ) -> Result<bool, ShardError>;

    async fn staged_balance(
        &self,
        claimant: Address,
        currency: &Currency,
    ) -> Result<U256, ShardError>;

    /// Claim fees for an accrual range and move them to the staged balance.
    async fn claim_and_stage_by_accruals(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError>;

    async fn claim_and_stage_by_block_numbers(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError>;

    async fn withdraw(
        &self,
        signer: &Signer,
        amount: U256,
        currency: &Currency,
        standard: TokenStandard,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError>;
}

pub type SharedShard = Arc<dyn ShardContract>;
