//! Base58Check string encoding for public addresses.
//!
//! ```text
//! [version:1][public_spend:32][public_view:32][checksum:4]
//! ```
//!
//! The checksum is the first four bytes of `SHA256(SHA256(payload))`.

use sha2::{Digest, Sha256};
use umbra_crypto::{decode_point, encode_point, is_in_prime_subgroup, CryptoError, ELEMENT_LENGTH};

use crate::{KeyError, PublicAddress};

/// Version byte for mainnet addresses.
pub const MAINNET_VERSION: u8 = 0x00;

/// Version byte for testnet addresses.
pub const TESTNET_VERSION: u8 = 0x01;

const CHECKSUM_LEN: usize = 4;

/// Encoded address length (version + 2 keys + checksum).
pub const ADDRESS_BYTES_LEN: usize = 1 + 2 * ELEMENT_LENGTH + CHECKSUM_LEN; // 69 bytes

/// Network an address string is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Test network.
    Testnet,
}

impl Network {
    /// Get the version byte for this network.
    pub fn version_byte(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_VERSION,
            Network::Testnet => TESTNET_VERSION,
        }
    }

    /// Create from version byte.
    pub fn from_version_byte(byte: u8) -> Option<Self> {
        match byte {
            MAINNET_VERSION => Some(Network::Mainnet),
            TESTNET_VERSION => Some(Network::Testnet),
            _ => None,
        }
    }
}

/// Serialize an address to raw bytes (including checksum).
pub fn address_to_bytes(address: &PublicAddress, network: Network) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ADDRESS_BYTES_LEN);

    bytes.push(network.version_byte());
    bytes.extend_from_slice(&encode_point(&address.public_spend));
    bytes.extend_from_slice(&encode_point(&address.public_view));

    let checksum = compute_checksum(&bytes);
    bytes.extend_from_slice(&checksum);

    bytes
}

/// Deserialize an address from raw bytes.
///
/// # Returns
/// * `Ok((PublicAddress, Network))` - Successfully decoded address
/// * `Err(KeyError)` - Bad length, checksum, version or key encoding
pub fn address_from_bytes(bytes: &[u8]) -> Result<(PublicAddress, Network), KeyError> {
    if bytes.len() != ADDRESS_BYTES_LEN {
        return Err(KeyError::InvalidLength {
            expected: ADDRESS_BYTES_LEN,
            actual: bytes.len(),
        });
    }

    let (payload, provided_checksum) = bytes.split_at(ADDRESS_BYTES_LEN - CHECKSUM_LEN);
    if provided_checksum != compute_checksum(payload) {
        return Err(KeyError::InvalidChecksum);
    }

    let version = payload[0];
    let network = Network::from_version_byte(version).ok_or(KeyError::InvalidVersion(version))?;

    let public_spend = decode_public_key(&payload[1..1 + ELEMENT_LENGTH])?;
    let public_view = decode_public_key(&payload[1 + ELEMENT_LENGTH..])?;

    Ok((PublicAddress::new(public_spend, public_view), network))
}

/// Encode an address as a Base58Check string.
pub fn encode_address(address: &PublicAddress, network: Network) -> String {
    bs58::encode(address_to_bytes(address, network)).into_string()
}

/// Decode a Base58Check address string, returning the network it was issued for.
pub fn decode_address(address_str: &str) -> Result<(PublicAddress, Network), KeyError> {
    let bytes = bs58::decode(address_str)
        .into_vec()
        .map_err(|e| KeyError::InvalidBase58(e.to_string()))?;

    address_from_bytes(&bytes)
}

/// Decode an address string and require it to belong to `expected`.
pub fn decode_address_for_network(
    address_str: &str,
    expected: Network,
) -> Result<PublicAddress, KeyError> {
    let (address, actual) = decode_address(address_str)?;

    if actual != expected {
        return Err(KeyError::NetworkMismatch { expected, actual });
    }

    Ok(address)
}

fn decode_public_key(bytes: &[u8]) -> Result<umbra_crypto::Point, KeyError> {
    let point = decode_point(bytes)?;
    if !is_in_prime_subgroup(&point) {
        return Err(CryptoError::InvalidPoint("public key has a small-order component".into()).into());
    }
    Ok(point)
}

fn compute_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash1 = Sha256::digest(payload);
    let hash2 = Sha256::digest(hash1);
    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&hash2[..CHECKSUM_LEN]);
    checksum
}
