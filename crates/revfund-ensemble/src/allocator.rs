//! Greedy withdrawal allocation across shards.
//!
//! Earlier (older) shards are drained first. A shard is only touched when it
//! has something to give, and iteration stops as soon as the request is
//! covered, so every shard sees at most one withdrawal.

use ethers::signers::Signer as _;
use ethers::types::U256;
use revfund_core::{
    min_amount, sum_amounts, Currency, ShardTransaction, Signer, TokenStandard, TxOptions,
};
use tracing::{info, warn};

use crate::ensemble::Ensemble;
use crate::error::{EnsembleError, Operation};

/// A planned draw of `amount` from the shard at `shard_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub shard_index: usize,
    pub amount: U256,
}

/// Split `requested` over per-shard staged balances.
pub fn plan_withdrawal(balances: &[U256], requested: U256) -> Result<Vec<Draw>, EnsembleError> {
    let available = sum_amounts(balances.iter().copied())?;
    if requested > available {
        return Err(EnsembleError::InsufficientBalance { requested, available });
    }

    let mut remaining = requested;
    let mut draws = Vec::new();
    for (shard_index, balance) in balances.iter().enumerate() {
        if remaining.is_zero() {
            break;
        }
        let amount = min_amount(remaining, *balance);
        if !amount.is_zero() {
            draws.push(Draw { shard_index, amount });
            remaining -= amount;
        }
    }
    Ok(draws)
}

impl Ensemble {
    /// Withdraw `amount` of the signer's staged fees, drawing from shards in order.
    ///
    /// Withdrawals for the same wallet and currency through this ensemble are
    /// serialized, so two callers cannot both spend the balance they observed.
    pub async fn withdraw(
        &self,
        signer: &Signer,
        currency: &Currency,
        amount: U256,
        standard: TokenStandard,
        options: &TxOptions,
    ) -> Result<Vec<ShardTransaction>, EnsembleError> {
        let wallet = signer.address();
        let lock = self.withdrawal_lock(wallet, currency);
        let _guard = lock.lock().await;

        self.decomposition(currency).await?;
        let balances = self.staged_balances(wallet, currency).await?;
        let draws = plan_withdrawal(&balances, amount).map_err(|e| {
            warn!(?wallet, %currency, %amount, error = %e, "withdrawal rejected");
            e
        })?;

        let mut submitted = Vec::with_capacity(draws.len());
        for draw in draws {
            let shard = &self.shards[draw.shard_index];
            let hash = shard
                .withdraw(signer, draw.amount, currency, standard, options)
                .await
                .map_err(|e| EnsembleError::shard(Operation::Withdraw, shard.address(), e))?;

            info!(
                ?wallet,
                %currency,
                shard = draw.shard_index,
                amount = %draw.amount,
                tx = ?hash,
                "withdraw submitted"
            );
            submitted.push(ShardTransaction {
                shard_index: draw.shard_index,
                shard: shard.address(),
                hash,
            });
        }
        Ok(submitted)
    }
}
