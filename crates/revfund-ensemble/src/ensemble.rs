use ethers::types::Address;
use parking_lot::Mutex;
use revfund_core::Currency;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cache::DecompositionCache;
use crate::decomposition::{self, Decomposition};
use crate::error::EnsembleError;
use crate::shard::SharedShard;

/// An ordered collection of fund shards treated as one logical fee fund.
///
/// Shard order is fixed at construction and follows deployment order. The
/// ensemble is meant to live for a whole wallet session: decompositions are
/// built lazily and kept until [`Ensemble::invalidate`] is called.
pub struct Ensemble {
    pub(crate) shards: Vec<SharedShard>,
    pub(crate) first_accrual_offset: u64,
    pub(crate) cache: DecompositionCache,
    withdrawal_locks: Mutex<HashMap<(Address, Currency), Arc<tokio::sync::Mutex<()>>>>,
}

impl Ensemble {
    pub fn new(shards: Vec<SharedShard>) -> Result<Self, EnsembleError> {
        if shards.is_empty() {
            return Err(EnsembleError::NoShards);
        }
        Ok(Ensemble {
            shards,
            first_accrual_offset: 0,
            cache: DecompositionCache::new(),
            withdrawal_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Ensemble of a single shard.
    pub fn single(shard: SharedShard) -> Self {
        Ensemble {
            shards: vec![shard],
            first_accrual_offset: 0,
            cache: DecompositionCache::new(),
            withdrawal_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Set where the global accrual numbering begins.
    pub fn with_first_accrual_offset(mut self, offset: u64) -> Self {
        self.first_accrual_offset = offset;
        self
    }

    pub fn shards(&self) -> &[SharedShard] {
        &self.shards
    }

    pub fn shard_addresses(&self) -> Vec<Address> {
        self.shards.iter().map(|shard| shard.address()).collect()
    }

    pub fn first_accrual_offset(&self) -> u64 {
        self.first_accrual_offset
    }

    /// The currency's decomposition, built on first use.
    pub async fn decomposition(
        &self,
        currency: &Currency,
    ) -> Result<Arc<Decomposition>, EnsembleError> {
        self.cache
            .get_or_build(currency, || {
                decomposition::build(&self.shards, self.first_accrual_offset, currency)
            })
            .await
    }

    pub fn is_decomposed(&self, currency: &Currency) -> bool {
        self.cache.is_decomposed(currency)
    }

    /// Forget the currency's decomposition so the next access rebuilds it
    /// from the shards' current closed accruals.
    pub fn invalidate(&self, currency: &Currency) -> bool {
        self.cache.invalidate(currency)
    }

    pub(crate) fn withdrawal_lock(
        &self,
        wallet: Address,
        currency: &Currency,
    ) -> Arc<tokio::sync::Mutex<()>> {
        self.withdrawal_locks.lock().entry((wallet, *currency)).or_default().clone()
    }
}

impl fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ensemble")
            .field("shards", &self.shard_addresses())
            .field("first_accrual_offset", &self.first_accrual_offset)
            .finish()
    }
}

pub(crate) fn ordered(start: u64, end: u64) -> Result<(), EnsembleError> {
    if start > end {
        return Err(EnsembleError::OrdinalityMismatch { start, end });
    }
    Ok(())
}
