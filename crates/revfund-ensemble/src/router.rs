//! Read-side routing: claimable amounts, fully-claimed checks and
//! ensemble-wide aggregates.

use ethers::types::{Address, U256};
use futures::future::try_join_all;
use revfund_core::{sum_amounts, sum_counts, Currency};
use tracing::{debug, warn};

use crate::decomposition::Dimension;
use crate::ensemble::{ordered, Ensemble};
use crate::error::{EnsembleError, Operation};

impl Ensemble {
    /// Fees claimable by `claimant` over the global accrual span
    /// `[start_accrual, end_accrual]`.
    pub async fn claimable_amount_by_accruals(
        &self,
        claimant: Address,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
    ) -> Result<U256, EnsembleError> {
        self.claimable_amount(claimant, currency, Dimension::Accruals, start_accrual, end_accrual)
            .await
    }

    /// Fees claimable by `claimant` over the block span `[start_block, end_block]`.
    pub async fn claimable_amount_by_block_numbers(
        &self,
        claimant: Address,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
    ) -> Result<U256, EnsembleError> {
        self.claimable_amount(claimant, currency, Dimension::BlockNumbers, start_block, end_block)
            .await
    }

    async fn claimable_amount(
        &self,
        claimant: Address,
        currency: &Currency,
        dimension: Dimension,
        low: u64,
        high: u64,
    ) -> Result<U256, EnsembleError> {
        ordered(low, high)?;
        let decomposition = self.decomposition(currency).await?;

        let clips = decomposition.overlapping(dimension, low, high);
        let amounts = try_join_all(clips.into_iter().map(|clip| {
            let shard = &self.shards[clip.shard_index];
            async move {
                debug!(
                    shard = clip.shard_index,
                    low = clip.low,
                    high = clip.high,
                    ?dimension,
                    "querying claimable amount"
                );
                let (amount, operation) = match dimension {
                    Dimension::Accruals => (
                        shard
                            .claimable_amount_by_accruals(claimant, currency, clip.low, clip.high)
                            .await,
                        Operation::ClaimableAmountByAccruals,
                    ),
                    Dimension::BlockNumbers => (
                        shard
                            .claimable_amount_by_block_numbers(
                                claimant, currency, clip.low, clip.high,
                            )
                            .await,
                        Operation::ClaimableAmountByBlockNumbers,
                    ),
                };
                amount.map_err(|e| EnsembleError::shard(operation, shard.address(), e))
            }
        }))
        .await?;

        Ok(sum_amounts(amounts)?)
    }

    /// Whether `claimant` has fully claimed the accrual at global index `accrual`.
    ///
    /// Answered by the one shard whose range holds the index. An index outside
    /// every shard, or a call exception from the shard, reads as not claimed.
    pub async fn fully_claimed(
        &self,
        claimant: Address,
        currency: &Currency,
        accrual: u64,
    ) -> Result<bool, EnsembleError> {
        let decomposition = self.decomposition(currency).await?;
        let Some(shard_index) = decomposition.shard_for_accrual(accrual) else {
            debug!(%currency, accrual, "accrual outside every shard");
            return Ok(false);
        };

        let shard = &self.shards[shard_index];
        match shard.fully_claimed(claimant, currency, accrual).await {
            Ok(claimed) => Ok(claimed),
            Err(e) if e.is_call_exception() => {
                warn!(shard = shard_index, accrual, error = %e, "fully claimed check reverted");
                Ok(false)
            }
            Err(e) => Err(EnsembleError::shard(Operation::FullyClaimed, shard.address(), e)),
        }
    }

    /// Closed accruals across all shards, read live from the chain.
    pub async fn closed_accruals_count(&self, currency: &Currency) -> Result<u64, EnsembleError> {
        let counts = try_join_all(self.shards.iter().map(|shard| async move {
            shard
                .closed_accruals_count(currency)
                .await
                .map_err(|e| {
                    EnsembleError::shard(Operation::ClosedAccrualsCount, shard.address(), e)
                })
        }))
        .await?;
        Ok(sum_counts(counts)?)
    }

    /// Staged balance of `claimant` on every shard, in shard order.
    pub async fn staged_balances(
        &self,
        claimant: Address,
        currency: &Currency,
    ) -> Result<Vec<U256>, EnsembleError> {
        try_join_all(self.shards.iter().map(|shard| async move {
            shard
                .staged_balance(claimant, currency)
                .await
                .map_err(|e| EnsembleError::shard(Operation::StagedBalance, shard.address(), e))
        }))
        .await
    }

    /// Aggregate staged balance of `claimant` across the ensemble.
    pub async fn staged_balance(
        &self,
        claimant: Address,
        currency: &Currency,
    ) -> Result<U256, EnsembleError> {
        let balances = self.staged_balances(claimant, currency).await?;
        Ok(sum_amounts(balances)?)
    }
}
