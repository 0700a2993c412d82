use ethers::types::{Address, U256};
use revfund_core::AmountOverflow;
use std::fmt;
use thiserror::Error;

/// Failure reported by a single shard binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    /// The contract rejected the call (revert, invalid range for a view).
    #[error("call exception: {0}")]
    CallException(String),
    /// RPC, signing or submission failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ShardError {
    pub fn is_call_exception(&self) -> bool {
        matches!(self, ShardError::CallException(_))
    }
}

/// The per-shard stage an ensemble operation was performing when a shard failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ClosedAccrualsCount,
    ClosedAccrual,
    ClaimableAmountByAccruals,
    ClaimableAmountByBlockNumbers,
    FullyClaimed,
    StagedBalance,
    ClaimAndStageByAccruals,
    ClaimAndStageByBlockNumbers,
    Withdraw,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ClosedAccrualsCount => "get closed accruals count",
            Operation::ClosedAccrual => "get closed accrual",
            Operation::ClaimableAmountByAccruals => "get claimable amount by accruals",
            Operation::ClaimableAmountByBlockNumbers => "get claimable amount by block numbers",
            Operation::FullyClaimed => "check fully claimed",
            Operation::StagedBalance => "get staged balance",
            Operation::ClaimAndStageByAccruals => "claim and stage by accruals",
            Operation::ClaimAndStageByBlockNumbers => "claim and stage by block numbers",
            Operation::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnsembleError {
    #[error("ensemble needs at least one shard")]
    NoShards,
    #[error("ordinality mismatch: start {start} is greater than end {end}")]
    OrdinalityMismatch { start: u64, end: u64 },
    #[error("insufficient staged balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: U256, available: U256 },
    #[error("amount overflow while aggregating shard values")]
    AmountOverflow,
    #[error("unable to {operation} on shard {shard:?}")]
    Shard {
        operation: Operation,
        shard: Address,
        #[source]
        source: ShardError,
    },
}

impl EnsembleError {
    pub(crate) fn shard(operation: Operation, shard: Address, source: ShardError) -> Self {
        EnsembleError::Shard { operation, shard, source }
    }
}

impl From<AmountOverflow> for EnsembleError {
    fn from(_: AmountOverflow) -> Self {
        EnsembleError::AmountOverflow
    }
}
