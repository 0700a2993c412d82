//! Revenue fund SDK.
//!
//! Re-exports the workspace crates under one roof:
//!
//! - [`types`]: currencies, transaction options and amount helpers,
//! - [`ensemble`]: the shard ensemble router,
//! - [`bindings`]: JSON-RPC shard bindings.

pub use revfund_core as types;
pub use revfund_ensemble as ensemble;
pub use revfund_ethers as bindings;

pub use revfund_core::{Currency, ShardTransaction, TokenStandard, TxOptions};
pub use revfund_ensemble::{Ensemble, EnsembleError, ShardContract, ShardError};
pub use revfund_ethers::{connect_ensemble, EnsembleSettings, EthersShard};
