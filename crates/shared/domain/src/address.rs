use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of bytes in an account identity.
pub const ADDRESS_LEN: usize = 20;

/// Errors produced while parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("address must be {expected} hex digits, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("address is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// An opaque, comparable account identity.
///
/// The all-zero value is the "absent" sentinel: an unset manager, a missing
/// recipient or token handle. It is never a valid owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Self = Self([0; ADDRESS_LEN]);

    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an address whose last byte is `n`. Handy for fixtures.
    #[must_use]
    pub const fn from_low_u8(n: u8) -> Self {
        let mut bytes = [0; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = n;
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Returns `None` for the zero sentinel.
    #[must_use]
    pub fn non_zero(self) -> Option<Self> {
        (!self.is_zero()).then_some(self)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_owned()))?;

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::Length { expected: ADDRESS_LEN * 2, actual: digits.len() });
        }

        let mut bytes = [0; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
