//! Aggregation helpers over per-shard quantities.
//!
//! Amounts are EVM words. Sums are checked: a total that would leave the
//! 256-bit range is reported instead of wrapping.

use ethers::types::U256;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount overflow")]
pub struct AmountOverflow;

/// Sum a sequence of amounts.
pub fn sum_amounts<I>(amounts: I) -> Result<U256, AmountOverflow>
where
    I: IntoIterator<Item = U256>,
{
    amounts
        .into_iter()
        .try_fold(U256::zero(), |acc, amount| acc.checked_add(amount).ok_or(AmountOverflow))
}

/// Sum a sequence of counts (closed accruals per shard).
pub fn sum_counts<I>(counts: I) -> Result<u64, AmountOverflow>
where
    I: IntoIterator<Item = u64>,
{
    counts
        .into_iter()
        .try_fold(0u64, |acc, count| acc.checked_add(count).ok_or(AmountOverflow))
}

pub fn min_amount(a: U256, b: U256) -> U256 {
    if a <= b {
        a
    } else {
        b
    }
}
