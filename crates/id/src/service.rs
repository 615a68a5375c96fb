//! Opaque id type and generators.

use crate::{IdError, IdResult};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::{fmt, str::FromStr};

/// Number of characters in a canonical opaque id.
pub const OPAQUE_ID_LEN: usize = 10;

/// A validated opaque id (10 ASCII alphanumeric characters).
///
/// Once constructed, the contained token is guaranteed to be canonical, so it is always safe
/// to use as a file name component.
///
/// # Construction
/// - [`OpaqueId::generate`] draws a fresh id from the thread-local CSPRNG.
/// - [`OpaqueId::parse`] validates an externally supplied id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueId(String);

impl OpaqueId {
    /// Generates a new random opaque id.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generates a new opaque id from the supplied RNG.
    ///
    /// Useful for deterministic ids in tests via a seeded RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let token: String = rng
            .sample_iter(&Alphanumeric)
            .take(OPAQUE_ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Validates and wraps an id string that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not exactly [`OPAQUE_ID_LEN`] ASCII
    /// alphanumeric characters.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::InvalidInput(format!(
            "opaque id must be {} alphanumeric characters, got: '{}'",
            OPAQUE_ID_LEN, input
        )))
    }

    /// Returns true if `input` is in canonical opaque id form.
    ///
    /// Purely syntactic; does not say anything about whether an artifact exists.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == OPAQUE_ID_LEN && input.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OpaqueId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpaqueId::parse(s)
    }
}

impl AsRef<str> for OpaqueId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for OpaqueId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OpaqueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OpaqueId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Source of fresh opaque ids.
///
/// The store operation asks for a new id on every exclusive-create attempt, so an
/// implementation must not hand out the same id twice in a row unless it is deliberately
/// simulating a collision.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> OpaqueId;
}

/// Default generator backed by the thread-local CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> OpaqueId {
        OpaqueId::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_produces_canonical_id() {
        let id = OpaqueId::generate();
        assert_eq!(id.as_str().len(), OPAQUE_ID_LEN);
        assert!(OpaqueId::is_canonical(id.as_str()));
    }

    #[test]
    fn test_generate_never_contains_separator() {
        for _ in 0..1_000 {
            let id = OpaqueId::generate();
            assert!(!id.as_str().contains('-'));
        }
    }

    #[test]
    fn test_generate_with_seeded_rng_is_deterministic() {
        let a = OpaqueId::generate_with(&mut StdRng::seed_from_u64(7));
        let b = OpaqueId::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_generator_yields_distinct_ids() {
        let generator = RandomIdGenerator;
        let ids: HashSet<OpaqueId> = (0..500).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_parse_valid_id() {
        let id = OpaqueId::parse("V1StGXR8Z5").unwrap();
        assert_eq!(id.to_string(), "V1StGXR8Z5");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(OpaqueId::parse("abc").is_err());
        assert!(OpaqueId::parse("abcdefghijk").is_err());
        assert!(OpaqueId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert!(OpaqueId::parse("../../etc/").is_err());
        assert!(OpaqueId::parse("abcd-efghi").is_err());
        assert!(OpaqueId::parse("abcd efghi").is_err());
    }

    #[test]
    fn test_parse_rejects_non_ascii() {
        // 10 bytes, 5 characters
        assert!(OpaqueId::parse("ééééé").is_err());
    }

    #[test]
    fn test_from_str_matches_parse() {
        let id: OpaqueId = "Abc123Xyz9".parse().unwrap();
        assert_eq!(id.as_ref(), "Abc123Xyz9");
        assert!("nope".parse::<OpaqueId>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip_validates() {
        let id = OpaqueId::parse("Abc123Xyz9").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Abc123Xyz9\"");
        assert!(serde_json::from_str::<OpaqueId>("\"../x\"").is_err());
    }
}
