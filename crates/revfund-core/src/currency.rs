use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fee currency: token contract address plus a sub-id (ERC-1155 style).
///
/// Addresses are compared as raw bytes, so two currencies parsed from
/// differently cased hex strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency {
    pub ct: Address,
    pub id: U256,
}

impl Currency {
    pub fn new(ct: Address, id: U256) -> Self {
        Currency { ct, id }
    }

    /// The chain's native coin, by convention the zero address with id 0.
    pub fn ether() -> Self {
        Currency { ct: Address::zero(), id: U256::zero() }
    }

    pub fn is_ether(&self) -> bool {
        self.ct.is_zero() && self.id.is_zero()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.ct, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_address_case_does_not_matter() {
        let lower: Address = "0x7ef5b4bbf4f7da0fd1a9d6e56d53b1a2f5d8b1c3".parse().unwrap();
        let mixed: Address = "0x7EF5B4BBF4F7DA0FD1A9D6E56D53B1A2F5D8B1C3".parse().unwrap();

        let a = Currency::new(lower, U256::from(1));
        let b = Currency::new(mixed, U256::from(1));
        assert_eq!(a, b);

        let mut keys = HashSet::new();
        keys.insert(a);
        assert!(keys.contains(&b));
    }

    #[test]
    fn test_id_distinguishes_currencies() {
        let ct: Address = "0x7ef5b4bbf4f7da0fd1a9d6e56d53b1a2f5d8b1c3".parse().unwrap();
        assert_ne!(Currency::new(ct, U256::zero()), Currency::new(ct, U256::one()));
    }

    #[test]
    fn test_ether() {
        assert!(Currency::ether().is_ether());
        assert!(!Currency::new(Address::repeat_byte(1), U256::zero()).is_ether());
    }
}
