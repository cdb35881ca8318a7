//! Core key types for stealth one-time addresses.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use umbra_crypto::{serde_point, Point, PrivateKey};

/// A user's private address: the spend key authorizes spending, the view key
/// recognizes incoming outputs.
///
/// Created once per user and never transmitted.
#[derive(Clone)]
pub struct PrivateAddress {
    /// Private spend key.
    pub private_spend: PrivateKey,
    /// Private view key.
    pub private_view: PrivateKey,
}

impl PrivateAddress {
    /// Create from existing keys.
    pub fn new(private_spend: PrivateKey, private_view: PrivateKey) -> Self {
        Self {
            private_spend,
            private_view,
        }
    }

    /// Generate two independent uniform keys from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate two independent uniform keys from the supplied CSPRNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self {
            private_spend: PrivateKey::generate_with_rng(rng),
            private_view: PrivateKey::generate_with_rng(rng),
        }
    }

    /// Derive the publishable address `{spend*G, view*G}`.
    pub fn public_address(&self) -> PublicAddress {
        PublicAddress {
            public_spend: self.private_spend.public_key(),
            public_view: self.private_view.public_key(),
        }
    }
}

impl std::fmt::Debug for PrivateAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateAddress")
            .field("public_address", &self.public_address())
            .finish()
    }
}

/// A published address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAddress {
    /// Public spend key `B`.
    #[serde(with = "serde_point")]
    pub public_spend: Point,
    /// Public view key `A`.
    #[serde(with = "serde_point")]
    pub public_view: Point,
}

impl PublicAddress {
    /// Create from the two public keys.
    pub fn new(public_spend: Point, public_view: Point) -> Self {
        Self {
            public_spend,
            public_view,
        }
    }
}

/// A transaction key (ephemeral, generated per transaction).
pub struct TxKey {
    /// Private transaction key `r`.
    pub private_key: PrivateKey,
    /// Public transaction key `R = r*G`.
    pub public_key: Point,
}

impl TxKey {
    /// Generate a new random transaction key.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a new transaction key from the supplied CSPRNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::from_private(PrivateKey::generate_with_rng(rng))
    }

    /// Create from a private key.
    pub fn from_private(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }
}

impl std::fmt::Debug for TxKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxKey")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// A stealth output as written into a transaction.
///
/// `output_index` is known to the sender; recipients recover it by trying a
/// bounded number of guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthOutput {
    /// Ephemeral public key `R`.
    #[serde(with = "serde_point")]
    pub ephemeral_pub_key: Point,
    /// One-time destination key `K° = Hs(r*A ‖ index)*G + B`.
    #[serde(with = "serde_point")]
    pub addressee: Point,
    /// Position of the output inside its transaction.
    pub output_index: u8,
}
