use ethers::types::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token standard forwarded to a shard's withdraw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ETH")]
    Ether,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl TokenStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStandard::Ether => "ETH",
            TokenStandard::Erc20 => "ERC20",
            TokenStandard::Erc721 => "ERC721",
            TokenStandard::Erc1155 => "ERC1155",
        }
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ETH" | "ETHER" => Ok(TokenStandard::Ether),
            "ERC20" => Ok(TokenStandard::Erc20),
            "ERC721" => Ok(TokenStandard::Erc721),
            "ERC1155" => Ok(TokenStandard::Erc1155),
            other => Err(format!("unknown token standard: {}", other)),
        }
    }
}

/// Overrides applied to a submitted transaction. Unset fields are left to
/// the binding's transport (gas estimation, nonce management).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxOptions {
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
    pub nonce: Option<U256>,
}

impl TxOptions {
    pub fn with_gas_limit(mut self, gas_limit: U256) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

/// Handle of a transaction submitted to one shard. The transaction may not
/// be mined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTransaction {
    /// Position of the shard in the ensemble.
    pub shard_index: usize,
    pub shard: Address,
    pub hash: TxHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_round_trips_through_str() {
        for standard in [
            TokenStandard::Ether,
            TokenStandard::Erc20,
            TokenStandard::Erc721,
            TokenStandard::Erc1155,
        ] {
            assert_eq!(standard.as_str().parse::<TokenStandard>().unwrap(), standard);
        }
        assert_eq!("erc20".parse::<TokenStandard>().unwrap(), TokenStandard::Erc20);
        assert!("ERC777".parse::<TokenStandard>().is_err());
    }

    #[test]
    fn test_standard_serializes_as_contract_string() {
        let json = serde_json::to_string(&TokenStandard::Erc1155).unwrap();
        assert_eq!(json, "\"ERC1155\"");
    }

    #[test]
    fn test_tx_options_builder() {
        let options = TxOptions::default()
            .with_gas_limit(U256::from(600_000))
            .with_gas_price(U256::from(1_000_000_000u64));
        assert_eq!(options.gas_limit, Some(U256::from(600_000)));
        assert_eq!(options.gas_price, Some(U256::from(1_000_000_000u64)));
        assert_eq!(options.nonce, None);
    }
}
