//! Per-currency partition of the global accrual and block spaces across shards.
//!
//! Shards are laid out in ensemble order. The first shard starts at the
//! ensemble's first accrual offset and every following shard starts one past
//! the end of its predecessor. A shard with no closed accruals takes an empty
//! slot at the running offset and never overlaps a query.
//!
//! Every slot's next offset must fit in a `u64`; a layout that would run past
//! it is rejected with [`EnsembleError::AmountOverflow`].

use futures::future::try_join_all;
use revfund_core::{sum_counts, Currency};
use std::ops::RangeInclusive;
use tracing::{debug, info};

use crate::error::{EnsembleError, Operation, ShardError};
use crate::shard::SharedShard;

/// Which global coordinate a range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Accruals,
    BlockNumbers,
}

/// Inclusive block bounds covered by a shard's closed accruals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
}

/// One shard's slice of the accrual and block spaces for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardDecomposition {
    pub start_accrual: u64,
    pub accrual_count: u64,
    pub blocks: Option<BlockRange>,
}

impl ShardDecomposition {
    pub fn is_empty(&self) -> bool {
        self.accrual_count == 0
    }

    /// Inclusive end accrual, `None` for an empty shard.
    pub fn end_accrual(&self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            self.start_accrual.checked_add(self.accrual_count - 1)
        }
    }

    pub fn accrual_range(&self) -> Option<RangeInclusive<u64>> {
        self.end_accrual().map(|end| self.start_accrual..=end)
    }

    pub fn block_range(&self) -> Option<RangeInclusive<u64>> {
        self.blocks.map(|blocks| blocks.start..=blocks.end)
    }

    pub fn range(&self, dimension: Dimension) -> Option<RangeInclusive<u64>> {
        match dimension {
            Dimension::Accruals => self.accrual_range(),
            Dimension::BlockNumbers => self.block_range(),
        }
    }

    /// Offset the next shard starts at, `None` past `u64::MAX`.
    pub fn next_accrual(&self) -> Option<u64> {
        self.start_accrual.checked_add(self.accrual_count)
    }
}

/// Decomposition of one currency over the whole ensemble, in shard order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub currency: Currency,
    pub shards: Vec<ShardDecomposition>,
}

/// A shard's share of a caller-supplied span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedRange {
    pub shard_index: usize,
    pub low: u64,
    pub high: u64,
}

impl Decomposition {
    /// Clip `[low, high]` against every shard range it overlaps, in shard order.
    ///
    /// The caller must have checked `low <= high`.
    pub fn overlapping(&self, dimension: Dimension, low: u64, high: u64) -> Vec<ClippedRange> {
        self.shards
            .iter()
            .enumerate()
            .filter_map(|(shard_index, shard)| {
                let range = shard.range(dimension)?;
                let (shard_low, shard_high) = (*range.start(), *range.end());
                if high >= shard_low && low <= shard_high {
                    Some(ClippedRange {
                        shard_index,
                        low: low.max(shard_low),
                        high: high.min(shard_high),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// First shard whose accrual range contains `accrual`.
    pub fn shard_for_accrual(&self, accrual: u64) -> Option<usize> {
        self.shards
            .iter()
            .position(|shard| shard.accrual_range().map_or(false, |range| range.contains(&accrual)))
    }

    pub fn total_accruals(&self) -> Result<u64, EnsembleError> {
        Ok(sum_counts(self.shards.iter().map(|shard| shard.accrual_count))?)
    }
}

/// Lay out accrual slots from per-shard closed accrual counts.
pub(crate) fn layout(
    first_accrual_offset: u64,
    counts: &[u64],
) -> Result<Vec<ShardDecomposition>, EnsembleError> {
    let mut running_offset = first_accrual_offset;
    counts
        .iter()
        .map(|&accrual_count| {
            let shard = ShardDecomposition {
                start_accrual: running_offset,
                accrual_count,
                blocks: None,
            };
            running_offset = shard.next_accrual().ok_or(EnsembleError::AmountOverflow)?;
            Ok(shard)
        })
        .collect()
}

/// Walk the shards once and compute the currency's decomposition.
///
/// Count reads and boundary reads are issued concurrently across shards; the
/// running offset is computed in shard order in between.
pub(crate) async fn build(
    shards: &[SharedShard],
    first_accrual_offset: u64,
    currency: &Currency,
) -> Result<Decomposition, EnsembleError> {
    let counts = try_join_all(shards.iter().map(|shard| async move {
        shard
            .closed_accruals_count(currency)
            .await
            .map_err(|e| EnsembleError::shard(Operation::ClosedAccrualsCount, shard.address(), e))
    }))
    .await?;

    let mut decomposed = layout(first_accrual_offset, &counts)?;

    let blocks = try_join_all(shards.iter().zip(decomposed.iter()).map(|(shard, slot)| async move {
        let Some(end_accrual) = slot.end_accrual() else {
            return Ok(None);
        };
        let wrap =
            |e: ShardError| EnsembleError::shard(Operation::ClosedAccrual, shard.address(), e);
        let first = shard.closed_accrual(currency, slot.start_accrual).await.map_err(wrap)?;
        let last = shard.closed_accrual(currency, end_accrual).await.map_err(wrap)?;
        Ok::<_, EnsembleError>(Some(BlockRange { start: first.start_block, end: last.end_block }))
    }))
    .await?;

    for (index, (slot, blocks)) in decomposed.iter_mut().zip(blocks).enumerate() {
        slot.blocks = blocks;
        debug!(
            %currency,
            shard = index,
            start = slot.start_accrual,
            count = slot.accrual_count,
            "shard decomposed"
        );
    }

    info!(%currency, shards = shards.len(), first_accrual_offset, "currency decomposed");
    Ok(Decomposition { currency: *currency, shards: decomposed })
}
