//! Per-currency memo of decompositions.
//!
//! Each currency owns a `OnceCell`. The first caller runs the build while
//! concurrent callers for the same currency wait on the same cell, so at most
//! one build per currency is in flight. A failed build leaves the cell empty
//! and the next caller retries.

use parking_lot::Mutex;
use revfund_core::Currency;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::decomposition::Decomposition;
use crate::error::EnsembleError;

type Slot = Arc<OnceCell<Arc<Decomposition>>>;

#[derive(Debug, Default)]
pub struct DecompositionCache {
    slots: Mutex<HashMap<Currency, Slot>>,
}

impl DecompositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached decomposition, running `build` if the currency has none yet.
    pub async fn get_or_build<F, Fut>(
        &self,
        currency: &Currency,
        build: F,
    ) -> Result<Arc<Decomposition>, EnsembleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Decomposition, EnsembleError>>,
    {
        let slot = self.slots.lock().entry(*currency).or_default().clone();
        let decomposition = slot
            .get_or_try_init(move || async move { build().await.map(Arc::new) })
            .await?;
        Ok(decomposition.clone())
    }

    pub fn is_decomposed(&self, currency: &Currency) -> bool {
        self.slots.lock().get(currency).map_or(false, |slot| slot.initialized())
    }

    /// Drop the currency's decomposition. Returns whether one was cached.
    ///
    /// A build already in flight completes into the evicted cell; later
    /// callers start from a fresh one.
    pub fn invalidate(&self, currency: &Currency) -> bool {
        self.slots
            .lock()
            .remove(currency)
            .map_or(false, |slot| slot.initialized())
    }
}
