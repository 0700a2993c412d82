//! JSON-RPC shard bindings built on ethers-rs.
//!
//! [`EthersShard`] implements [`revfund_ensemble::ShardContract`] against a
//! deployed revenue fund contract; [`connect_ensemble`] turns a list of shard
//! addresses into a ready [`revfund_ensemble::Ensemble`].

pub mod contract;
pub mod settings;

pub use contract::{EthersShard, RevenueFund};
pub use settings::{connect_ensemble, EnsembleSettings};
