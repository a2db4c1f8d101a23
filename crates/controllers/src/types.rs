//! Identity types shared by controllers and collaborators

use std::fmt;
use std::str::FromStr;

use crate::errors::ControllerError;

/// Unix timestamp in seconds, as reported by the host clock
pub type UnixTimestamp = i64;

/// Account identity (20 bytes)
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct Address(pub [u8; 20]);

/// Tokens are identified by their contract address
pub type TokenId = Address;

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose bytes are all `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 20];
        decode_hex(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Pool identifier as registered in the vault.
///
/// Layout: 20-byte pool address, 2-byte specialization, 10-byte nonce. The pool
/// address is therefore a pure function of the id.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    pub fn new(pool_address: Address, specialization: u16, nonce: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..20].copy_from_slice(pool_address.as_bytes());
        bytes[20..22].copy_from_slice(&specialization.to_be_bytes());
        // nonce occupies the trailing 10 bytes; the top two are always zero here
        bytes[24..32].copy_from_slice(&nonce.to_be_bytes());
        Self(bytes)
    }

    /// Address of the pool this id refers to
    pub fn pool_address(&self) -> Address {
        let mut address = [0u8; 20];
        address.copy_from_slice(&self.0[..20]);
        Address(address)
    }

    pub fn specialization(&self) -> u16 {
        u16::from_be_bytes([self.0[20], self.0[21]])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for PoolId {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        decode_hex(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

fn decode_hex(s: &str, out: &mut [u8]) -> Result<(), ControllerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode_to_slice(digits, out)
        .map_err(|_| ControllerError::InvalidIdentifier(s.to_string()))
}

// Identifiers travel as hex strings in off-chain payloads
#[cfg(feature = "client")]
mod hex_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Address::from_str(&s).map_err(serde::de::Error::custom)
        }
    }

    impl Serialize for PoolId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for PoolId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            PoolId::from_str(&s).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_address_is_prefix_of_pool_id() {
        let address = Address::repeat_byte(0xab);
        let pool_id = PoolId::new(address, 1, 42);

        assert_eq!(pool_id.pool_address(), address);
        assert_eq!(pool_id.specialization(), 1);
        assert_eq!(pool_id.0[31], 42);
    }

    #[test]
    fn test_pool_id_hex_round_trip() {
        let pool_id = PoolId::new(Address::repeat_byte(0xba), 2, 7);
        let text = pool_id.to_string();

        assert_eq!(text.len(), 2 + 64);
        assert_eq!(text.parse::<PoolId>().unwrap(), pool_id);
        assert_eq!(
            text.parse::<Address>().unwrap_err(),
            ControllerError::InvalidIdentifier(text.clone())
        );
    }

    #[test]
    fn test_address_hex_parsing() {
        let address = Address::repeat_byte(0x0f);
        let text = address.to_string();
        assert_eq!(text, format!("0x{}", "0f".repeat(20)));
        assert_eq!(text.parse::<Address>().unwrap(), address);

        assert!("0x1234".parse::<Address>().is_err());
        assert!(format!("0x{}", "zz".repeat(20)).parse::<Address>().is_err());
        assert!(format!("0x{}", "é".repeat(20)).parse::<Address>().is_err());

        let upper = format!("0X{}", "AB".repeat(20));
        assert!(upper.parse::<Address>().is_err());
        let bare = "AB".repeat(20);
        assert_eq!(bare.parse::<Address>().unwrap(), Address::repeat_byte(0xab));
    }
}
