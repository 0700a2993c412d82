use ethers::providers::Middleware;
use ethers::types::Address;
use revfund_ensemble::{Ensemble, EnsembleError, SharedShard};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::contract::EthersShard;

/// Shard deployments in chronological order, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnsembleSettings {
    pub shards: Vec<Address>,
    /// Global index of the first shard's first accrual.
    #[serde(default)]
    pub first_accrual_offset: u64,
}

/// Bind every configured shard address over `client` and assemble the ensemble.
pub fn connect_ensemble<M>(
    client: Arc<M>,
    chain_id: u64,
    settings: &EnsembleSettings,
) -> Result<Ensemble, EnsembleError>
where
    M: Middleware + Clone + 'static,
{
    let shards: Vec<SharedShard> = settings
        .shards
        .iter()
        .map(|address| {
            Arc::new(EthersShard::new(*address, client.clone(), chain_id)) as SharedShard
        })
        .collect();

    let ensemble =
        Ensemble::new(shards)?.with_first_accrual_offset(settings.first_accrual_offset);
    info!(
        shards = settings.shards.len(),
        chain_id,
        first_accrual_offset = settings.first_accrual_offset,
        "ensemble connected"
    );
    Ok(ensemble)
}
