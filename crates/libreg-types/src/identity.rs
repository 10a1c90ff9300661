use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Prefix used by [`Identity::short_id`] and accepted by [`Identity::from_hex`].
const ID_PREFIX: &str = "id:";

/// Material used to derive an [`Identity`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMaterial {
    /// A human-readable account label (e.g. "alice").
    Label(String),
    /// An ed25519-style public key (32 bytes).
    PublicKey([u8; 32]),
    /// Arbitrary 32 bytes supplied by the host (e.g. an account address).
    Raw([u8; 32]),
}

/// Opaque caller identity.
///
/// The registry never looks inside an `Identity`; it only compares them.
/// Identities are derived deterministically from [`IdentityMaterial`] using
/// BLAKE3, so the same material always yields the same identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    hash: [u8; 32],
}

impl Identity {
    /// Derive an `Identity` from identity material.
    pub fn derive(material: &IdentityMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"libreg-identity-v1:");
        match material {
            IdentityMaterial::Label(label) => {
                hasher.update(b"label:");
                hasher.update(label.as_bytes());
            }
            IdentityMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            IdentityMaterial::Raw(bytes) => {
                hasher.update(b"raw:");
                hasher.update(bytes);
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Shorthand for `derive(&IdentityMaterial::Label(..))`.
    pub fn from_label(label: impl Into<String>) -> Self {
        Self::derive(&IdentityMaterial::Label(label.into()))
    }

    /// Create an ephemeral (random) identity for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&IdentityMaterial::Raw(bytes))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("{ID_PREFIX}{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `id:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix(ID_PREFIX).unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let hash: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self { hash })
    }

    /// Create from a raw 32-byte hash. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_id())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = Identity::from_label("alice");
        let b = Identity::from_label("alice");
        assert_eq!(a, b);
    }

    #[test]
    fn different_labels_produce_different_ids() {
        assert_ne!(Identity::from_label("alice"), Identity::from_label("bob"));
    }

    #[test]
    fn material_kinds_are_domain_separated() {
        let bytes = [7u8; 32];
        let pubkey = Identity::derive(&IdentityMaterial::PublicKey(bytes));
        let raw = Identity::derive(&IdentityMaterial::Raw(bytes));
        assert_ne!(pubkey, raw);
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        assert_ne!(Identity::ephemeral(), Identity::ephemeral());
    }

    #[test]
    fn short_id_format() {
        let short = Identity::from_label("carol").short_id();
        assert!(short.starts_with("id:"));
        assert_eq!(short.len(), 11);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let id = Identity::from_label("dave");
        let parsed = Identity::from_hex(&format!("id:{}", id.to_hex())).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Identity::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Identity::from_hex("not-hex"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let id = Identity::from_label("erin");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
