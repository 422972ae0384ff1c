use crate::error::{DomainError, DomainResult};
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest decimal precision accepted for a token.
pub const MAX_DECIMALS: u8 = 36;

/// An ERC-20 style token identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Checks that the address is a non-empty alphanumeric identifier and the
    /// precision is within range.
    pub fn validate(&self) -> DomainResult<()> {
        if self.address.is_empty() {
            return Err(DomainError::InvalidToken(format!(
                "{} has an empty address",
                self.symbol
            )));
        }
        if !self.address.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidToken(format!(
                "malformed address {:?}",
                self.address
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(DomainError::InvalidToken(format!(
                "{} declares {} decimals (max {})",
                self.symbol, self.decimals, MAX_DECIMALS
            )));
        }
        Ok(())
    }

    /// Lowercased address, used for ordering and map keys.
    pub fn key(&self) -> String {
        self.address.to_ascii_lowercase()
    }

    /// Case-insensitive address comparison.
    pub fn same_address(&self, other: &str) -> bool {
        self.address.eq_ignore_ascii_case(other)
    }

    /// Whether this token is token0 of a pool it shares with `other`.
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.key() < other.key()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Unordered pair of token addresses. `token0` is always the smaller address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair {
    token0: String,
    token1: String,
}

impl TokenPair {
    pub fn new(a: &Token, b: &Token) -> Self {
        Self::from_addresses(&a.address, &b.address)
    }

    pub fn from_addresses(a: &str, b: &str) -> Self {
        let a = a.to_ascii_lowercase();
        let b = b.to_ascii_lowercase();
        if a <= b {
            Self { token0: a, token1: b }
        } else {
            Self { token0: b, token1: a }
        }
    }

    pub fn token0(&self) -> &str {
        &self.token0
    }

    pub fn token1(&self) -> &str {
        &self.token1
    }

    pub fn contains(&self, address: &str) -> bool {
        self.token0.eq_ignore_ascii_case(address) || self.token1.eq_ignore_ascii_case(address)
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

/// Raw token amount in the token's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl From<U256> for TokenAmount {
    fn from(v: U256) -> Self {
        Self(v)
    }
}

impl FromStr for TokenAmount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace('_', "");
        U256::from_dec_str(&trimmed)
            .map(Self)
            .map_err(|_| DomainError::InvalidAmount(format!("{s:?} is not a non-negative integer")))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Amounts travel as base-10 strings so JSON consumers never lose precision.
impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
