//! Strong type definitions for cordial.
//!
//! Identifiers are newtypes so a shard index can never be passed where an
//! entity id is expected.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Milliseconds between the Unix epoch and the platform epoch (2015-01-01).
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

/// A 64-bit unique identifier assigned by the server.
///
/// The zero value is the empty identifier: an entity whose id is empty has
/// no server-side counterpart yet. On the wire a snowflake is a decimal
/// string; integers are accepted when decoding.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(pub u64);

impl Snowflake {
    /// The empty identifier.
    pub const EMPTY: Self = Self(0);

    /// Create a snowflake from its raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the empty identifier.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Creation time encoded in the identifier, as Unix milliseconds.
    pub const fn timestamp_millis(self) -> u64 {
        (self.0 >> 22) + PLATFORM_EPOCH_MS
    }
}

impl fmt::Debug for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snowflake({})", self.0)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Snowflake {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidSnowflake(s.to_string()))
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnowflakeVisitor;

        impl<'de> Visitor<'de> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake as a decimal string or unsigned integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Snowflake, E> {
                Ok(Snowflake(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Snowflake, E> {
                u64::try_from(v)
                    .map(Snowflake)
                    .map_err(|_| E::custom(format!("negative snowflake: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Snowflake, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Index of one gateway connection within the client's shard set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(pub u32);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snowflake_decodes_string_and_integer() {
        let a: Snowflake = serde_json::from_str("\"244200618854580224\"").unwrap();
        let b: Snowflake = serde_json::from_str("244200618854580224").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(), 244200618854580224);
    }

    #[test]
    fn test_snowflake_encodes_as_string() {
        let json = serde_json::to_string(&Snowflake::new(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn test_snowflake_rejects_garbage() {
        assert!(serde_json::from_str::<Snowflake>("\"not-a-number\"").is_err());
        assert!(serde_json::from_str::<Snowflake>("-4").is_err());
        assert!("12x".parse::<Snowflake>().is_err());
    }

    #[test]
    fn test_snowflake_empty() {
        assert!(Snowflake::EMPTY.is_empty());
        assert!(Snowflake::default().is_empty());
        assert!(!Snowflake::new(1).is_empty());
    }

    #[test]
    fn test_snowflake_timestamp() {
        // Worked example from the platform documentation.
        let id = Snowflake::new(175928847299117063);
        assert_eq!(id.timestamp_millis(), 1462015105796);
    }

    proptest! {
        #[test]
        fn test_string_and_integer_forms_agree(raw in 0u64..=u64::MAX) {
            let from_str: Snowflake = serde_json::from_str(&format!("\"{raw}\"")).unwrap();
            let from_int: Snowflake = serde_json::from_str(&raw.to_string()).unwrap();
            prop_assert_eq!(from_str, from_int);
        }

        #[test]
        fn test_timestamp_is_monotonic(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assert!(
                Snowflake::new(lo).timestamp_millis() <= Snowflake::new(hi).timestamp_millis()
            );
        }
    }
}
