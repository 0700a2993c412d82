use async_trait::async_trait;
use ethers::contract::{abigen, ContractCall, ContractError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::Middleware;
use ethers::signers::Signer as _;
use ethers::types::{Address, TxHash, U256};
use revfund_core::{Currency, Signer, TokenStandard, TxOptions};
use revfund_ensemble::{ClosedAccrual, ShardContract, ShardError};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

abigen!(
    RevenueFund,
    r#"[
        function closedAccrualsCount(address currencyCt, uint256 currencyId) external view returns (uint256)
        function closedAccrualsByCurrency(address currencyCt, uint256 currencyId, uint256 index) external view returns (uint256, uint256, uint256)
        function claimableAmountByAccruals(address wallet, address currencyCt, uint256 currencyId, uint256 startAccrualIndex, uint256 endAccrualIndex) external view returns (uint256)
        function claimableAmountByBlockNumbers(address wallet, address currencyCt, uint256 currencyId, uint256 startBlock, uint256 endBlock) external view returns (uint256)
        function fullyClaimed(address wallet, address currencyCt, uint256 currencyId, uint256 accrualIndex) external view returns (bool)
        function stagedBalance(address wallet, address currencyCt, uint256 currencyId) external view returns (uint256)
        function claimAndStageByAccruals(address currencyCt, uint256 currencyId, uint256 startAccrualIndex, uint256 endAccrualIndex) external
        function claimAndStageByBlockNumbers(address currencyCt, uint256 currencyId, uint256 startBlock, uint256 endBlock) external
        function withdraw(uint256 amount, address currencyCt, uint256 currencyId, string standard) external
    ]"#
);

/// Revenue fund shard reached over any ethers middleware.
///
/// Views go through the plain middleware. State-changing calls wrap it in a
/// `SignerMiddleware` bound to the caller's wallet for the duration of the call.
pub struct EthersShard<M> {
    address: Address,
    client: Arc<M>,
    chain_id: u64,
    reader: RevenueFund<M>,
}

impl<M: Middleware + Clone + 'static> EthersShard<M> {
    pub fn new(address: Address, client: Arc<M>, chain_id: u64) -> Self {
        let reader = RevenueFund::new(address, client.clone());
        EthersShard { address, client, chain_id, reader }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn writer(&self, signer: &Signer) -> RevenueFund<SignerMiddleware<M, Signer>> {
        let signer = signer.clone().with_chain_id(self.chain_id);
        let client = SignerMiddleware::new(self.client.as_ref().clone(), signer);
        RevenueFund::new(self.address, Arc::new(client))
    }
}

impl<M> fmt::Debug for EthersShard<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthersShard")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Reverts become call exceptions; anything else is a transport failure.
pub(crate) fn classify<M: Middleware>(err: ContractError<M>) -> ShardError {
    let message = err.to_string();
    if matches!(err, ContractError::Revert(_)) || message.contains("execution reverted") {
        ShardError::CallException(message)
    } else {
        ShardError::Transport(message)
    }
}

pub(crate) fn to_u64(value: U256, what: &str) -> Result<u64, ShardError> {
    if value > U256::from(u64::MAX) {
        return Err(ShardError::CallException(format!(
            "{} {} does not fit in 64 bits",
            what, value
        )));
    }
    Ok(value.low_u64())
}

async fn submit<M: Middleware>(
    call: ContractCall<M, ()>,
    options: &TxOptions,
) -> Result<TxHash, ShardError> {
    let mut call = call;
    if let Some(gas) = options.gas_limit {
        call = call.gas(gas);
    }
    if let Some(gas_price) = options.gas_price {
        call = call.gas_price(gas_price);
    }
    if let Some(nonce) = options.nonce {
        call = call.nonce(nonce);
    }
    let pending = call.send().await.map_err(classify)?;
    Ok(pending.tx_hash())
}

#[async_trait]
impl<M: Middleware + Clone + 'static> ShardContract for EthersShard<M> {
    fn address(&self) -> Address {
        self.address
    }

    async fn closed_accruals_count(&self, currency: &Currency) -> Result<u64, ShardError> {
        let count = self
            .reader
            .closed_accruals_count(currency.ct, currency.id)
            .call()
            .await
            .map_err(classify)?;
        to_u64(count, "closed accruals count")
    }

    async fn closed_accrual(
        &self,
        currency: &Currency,
        index: u64,
    ) -> Result<ClosedAccrual, ShardError> {
        let (start_block, end_block, amount) = self
            .reader
            .closed_accruals_by_currency(currency.ct, currency.id, U256::from(index))
            .call()
            .await
            .map_err(classify)?;
        Ok(ClosedAccrual {
            start_block: to_u64(start_block, "start block")?,
            end_block: to_u64(end_block, "end block")?,
            amount,
        })
    }

    async fn claimable_amount_by_accruals(
        &self,
        claimant: Address,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
    ) -> Result<U256, ShardError> {
        self.reader
            .claimable_amount_by_accruals(
                claimant,
                currency.ct,
                currency.id,
                U256::from(start_accrual),
                U256::from(end_accrual),
            )
            .call()
            .await
            .map_err(classify)
    }

    async fn claimable_amount_by_block_numbers(
        &self,
        claimant: Address,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
    ) -> Result<U256, ShardError> {
        self.reader
            .claimable_amount_by_block_numbers(
                claimant,
                currency.ct,
                currency.id,
                U256::from(start_block),
                U256::from(end_block),
            )
            .call()
            .await
            .map_err(classify)
    }

    async fn fully_claimed(
        &self,
        claimant: Address,
        currency: &Currency,
        accrual: u64,
    ) -> Result<bool, ShardError> {
        self.reader
            .fully_claimed(claimant, currency.ct, currency.id, U256::from(accrual))
            .call()
            .await
            .map_err(classify)
    }

    async fn staged_balance(
        &self,
        claimant: Address,
        currency: &Currency,
    ) -> Result<U256, ShardError> {
        self.reader
            .staged_balance(claimant, currency.ct, currency.id)
            .call()
            .await
            .map_err(classify)
    }

    async fn claim_and_stage_by_accruals(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_accrual: u64,
        end_accrual: u64,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        debug!(
            shard = ?self.address,
            wallet = ?signer.address(),
            start_accrual,
            end_accrual,
            "claimAndStageByAccruals"
        );
        let writer = self.writer(signer);
        let call = writer.claim_and_stage_by_accruals(
            currency.ct,
            currency.id,
            U256::from(start_accrual),
            U256::from(end_accrual),
        );
        submit(call, options).await
    }

    async fn claim_and_stage_by_block_numbers(
        &self,
        signer: &Signer,
        currency: &Currency,
        start_block: u64,
        end_block: u64,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        debug!(
            shard = ?self.address,
            wallet = ?signer.address(),
            start_block,
            end_block,
            "claimAndStageByBlockNumbers"
        );
        let writer = self.writer(signer);
        let call = writer.claim_and_stage_by_block_numbers(
            currency.ct,
            currency.id,
            U256::from(start_block),
            U256::from(end_block),
        );
        submit(call, options).await
    }

    async fn withdraw(
        &self,
        signer: &Signer,
        amount: U256,
        currency: &Currency,
        standard: TokenStandard,
        options: &TxOptions,
    ) -> Result<TxHash, ShardError> {
        debug!(shard = ?self.address, wallet = ?signer.address(), %amount, %standard, "withdraw");
        let writer = self.writer(signer);
        let call = writer.withdraw(amount, currency.ct, currency.id, standard.as_str().to_string());
        submit(call, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{Http, Provider};
    use ethers::types::Bytes;

    #[test]
    fn test_revert_is_call_exception() {
        let err =
            ContractError::<Provider<Http>>::Revert(Bytes::from(vec![0x08, 0xc3, 0x79, 0xa0]));
        assert!(classify(err).is_call_exception());
    }

    #[test]
    fn test_decoding_failure_is_transport() {
        let err = ContractError::<Provider<Http>>::ContractNotDeployed;
        assert!(matches!(classify(err), ShardError::Transport(_)));
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(to_u64(U256::from(42), "count").unwrap(), 42);
        assert!(to_u64(U256::from(u64::MAX) + 1, "count").is_err());
    }

    #[test]
    fn test_shard_reports_its_address() {
        let provider = Provider::<Http>::try_from("http://localhost:8545").unwrap();
        let address = Address::repeat_byte(0x42);
        let shard = EthersShard::new(address, Arc::new(provider), 1);
        assert_eq!(shard.address(), address);
        assert_eq!(shard.chain_id(), 1);
    }
}
