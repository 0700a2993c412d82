//! Value objects shared by the revenue fund crates.
//!
//! Everything here is plain data: currencies used as cache keys, transaction
//! options forwarded to shard bindings, handles of submitted transactions and
//! the small amount helpers the ensemble aggregates with.

pub mod amount;
pub mod currency;
pub mod transaction;

pub use amount::{min_amount, sum_amounts, sum_counts, AmountOverflow};
pub use currency::Currency;
pub use transaction::{ShardTransaction, TokenStandard, TxOptions};

pub use ethers::types::{Address, TxHash, U256};

/// Signer used for every state-changing shard call.
pub type Signer = ethers::signers::LocalWallet;
