//! Shard ensemble router for revenue fund fee claims.
//!
//! A revenue fund is spread over a succession of deployed contracts
//! ("shards"). For each currency the ensemble works out which slice of the
//! global accrual and block spaces every shard covers, then:
//!
//! - answers claimable-amount and fully-claimed queries that may cross shard
//!   boundaries ([`Ensemble::claimable_amount_by_accruals`],
//!   [`Ensemble::fully_claimed`], ...),
//! - dispatches claim-and-stage transactions with per-shard clipped ranges
//!   ([`Ensemble::claim_and_stage_by_accruals`], ...),
//! - allocates withdrawals greedily over shards whose individual staged
//!   balances are too small ([`Ensemble::withdraw`]).
//!
//! Shards are reached through the [`ShardContract`] trait; see the
//! `revfund-ethers` crate for a JSON-RPC binding.

pub mod allocator;
pub mod cache;
pub mod decomposition;
pub mod dispatcher;
pub mod ensemble;
pub mod error;
pub mod router;
pub mod shard;

pub use allocator::{plan_withdrawal, Draw};
pub use cache::DecompositionCache;
pub use decomposition::{BlockRange, ClippedRange, Decomposition, Dimension, ShardDecomposition};
pub use ensemble::Ensemble;
pub use error::{EnsembleError, Operation, ShardError};
pub use shard::{ClosedAccrual, ShardContract, SharedShard};
