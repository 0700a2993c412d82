//! Claim-and-stage dispatch across overlapping shards.
//!
//! Transactions go out one shard at a time in ensemble order. The first
//! failing shard aborts the loop; transactions already submitted to earlier
//! shards stay submitted.

use ethers::signers::Signer as _;
use revfund_core::{Currency, ShardTransaction, Signer, TxOptions};
use tracing::info;

use crate::decomposition::Dimension;
use crate::ensemble::{ordered, Ensemble};
use crate::error::{EnsembleError, Operation};

impl Ensemble {
    /// Claim and stage the signer's fees for the global accrual span
    /// `[start_accrual, end_accrual]`, one transaction per overlapping shard.
    pub async fn claim_and_stage_by_accruals(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
        options: &TxOptions,
    ) -> Result<Vec<ShardTransaction>, EnsembleError> {
        self.claim_and_stage(
            signer,
            currency,
            Dimension::Accruals,
            start_accrual,
            end_accrual,
            options,
        )
        .await
    }

    /// Claim and stage the signer's fees for the block span `[start_block, end_block]`.
    pub async fn claim_and_stage_by_block_numbers(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
        options: &TxOptions,
    ) -> Result<Vec<ShardTransaction>, EnsembleError> {
        self.claim_and_stage(
            signer,
            currency,
            Dimension::BlockNumbers,
            start_block,
            end_block,
            options,
        )
        .await
    }

    async fn claim_and_stage(
        &self,
        signer: &Signer,
        currency: &Currency,
        dimension: Dimension,
        low: u64,
        high: u64,
        options: &TxOptions,
    ) -> Result<Vec<ShardTransaction>, EnsembleError> {
        ordered(low, high)?;
        let decomposition = self.decomposition(currency).await?;

        let mut submitted = Vec::new();
        for clip in decomposition.overlapping(dimension, low, high) {
            let shard = &self.shards[clip.shard_index];
            let (operation, result) = match dimension {
                Dimension::Accruals => (
                    Operation::ClaimAndStageByAccruals,
                    shard
                        .claim_and_stage_by_accruals(signer, currency, clip.low, clip.high, options)
                        .await,
                ),
                Dimension::BlockNumbers => (
                    Operation::ClaimAndStageByBlockNumbers,
                    shard
                        .claim_and_stage_by_block_numbers(
                            signer, currency, clip.low, clip.high, options,
                        )
                        .await,
                ),
            };
            let hash = result.map_err(|e| EnsembleError::shard(operation, shard.address(), e))?;

            info!(
                wallet = ?signer.address(),
                %currency,
                shard = clip.shard_index,
                low = clip.low,
                high = clip.high,
                tx = ?hash,
                "{} submitted", operation
            );
            submitted.push(ShardTransaction {
                shard_index: clip.shard_index,
                shard: shard.address(),
                hash,
            });
        }
        Ok(submitted)
    }
}
