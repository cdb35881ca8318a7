//! Output ownership verification.

use umbra_crypto::{Point, PrivateKey};

use crate::derivation::{addressee_from_shared, derive_key_image, derive_private_key_of_output};
use crate::shared_secret::shared_point;
use crate::{PrivateAddress, StealthOutput};

/// A detected output that belongs to a wallet.
#[derive(Debug, Clone)]
pub struct OwnedOutput {
    /// Index of this output in the transaction.
    pub output_index: u8,
    /// The one-time public key of this output.
    pub one_time_public_key: Point,
    /// The derived one-time private key (for spending).
    pub one_time_private_key: PrivateKey,
    /// The key image (for double-spend detection).
    pub key_image: Point,
}

/// Check if an output with a known index belongs to this address.
///
/// This verifies ownership by computing:
/// ```text
/// K' = Hs(a*R ‖ index)*G + B
/// ```
/// and checking if K' == K° (the output's addressee).
pub fn matches_address(
    address: &PrivateAddress,
    ephemeral_pub_key: &Point,
    addressee: &Point,
    output_index: u8,
) -> bool {
    let shared = shared_point(ephemeral_pub_key, &address.private_view);
    addressee_from_shared(&shared, &address.private_spend.public_key(), output_index) == *addressee
}

/// Recover the index an output was created with.
///
/// The index is not published, so indices `0..max_index_guesses` are tried in
/// order. `a*R` is computed once and reused for every guess.
///
/// # Returns
/// `Some(index)` for the first index that reproduces `addressee`, `None` if the
/// output is not ours (or was created with an index outside the range).
pub fn find_output_index(
    address: &PrivateAddress,
    ephemeral_pub_key: &Point,
    addressee: &Point,
    max_index_guesses: u16,
) -> Option<u8> {
    let shared = shared_point(ephemeral_pub_key, &address.private_view);
    let public_spend = address.private_spend.public_key();

    (0..max_index_guesses.min(256))
        .map(|guess| guess as u8)
        .find(|&guess| addressee_from_shared(&shared, &public_spend, guess) == *addressee)
}

/// Scan a batch of outputs and return the ones spendable by this address.
///
/// Each output's recorded `output_index` is ignored; the index is recovered
/// with [`find_output_index`] the same way a wallet sees it on chain.
pub fn scan_outputs(
    address: &PrivateAddress,
    outputs: &[StealthOutput],
    max_index_guesses: u16,
) -> Vec<OwnedOutput> {
    outputs
        .iter()
        .filter_map(|output| {
            let output_index = find_output_index(
                address,
                &output.ephemeral_pub_key,
                &output.addressee,
                max_index_guesses,
            )?;

            let one_time_private_key =
                derive_private_key_of_output(address, &output.ephemeral_pub_key, output_index);
            let key_image = derive_key_image(&one_time_private_key);

            Some(OwnedOutput {
                output_index,
                one_time_public_key: output.addressee,
                one_time_private_key,
                key_image,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::{generate_output_address, generate_output_address_with_key};
    use crate::TxKey;

    #[test]
    fn test_matches_own_output() {
        let wallet = PrivateAddress::generate();
        let (output, _) = generate_output_address(&wallet.public_address(), 4);

        assert!(matches_address(&wallet, &output.ephemeral_pub_key, &output.addressee, 4));
        assert!(!matches_address(&wallet, &output.ephemeral_pub_key, &output.addressee, 5));
    }

    #[test]
    fn test_does_not_match_other_wallet() {
        let wallet = PrivateAddress::generate();
        let other = PrivateAddress::generate();
        let (output, _) = generate_output_address(&wallet.public_address(), 0);

        assert!(!matches_address(&other, &output.ephemeral_pub_key, &output.addressee, 0));
    }

    #[test]
    fn test_find_output_index() {
        let wallet = PrivateAddress::generate();
        let (output, _) = generate_output_address(&wallet.public_address(), 7);

        assert_eq!(
            find_output_index(&wallet, &output.ephemeral_pub_key, &output.addressee, 16),
            Some(7)
        );
        // Index outside the guessed range is not found
        assert_eq!(
            find_output_index(&wallet, &output.ephemeral_pub_key, &output.addressee, 7),
            None
        );
    }

    #[test]
    fn test_find_output_index_zero_guesses() {
        let wallet = PrivateAddress::generate();
        let (output, _) = generate_output_address(&wallet.public_address(), 0);

        assert_eq!(
            find_output_index(&wallet, &output.ephemeral_pub_key, &output.addressee, 0),
            None
        );
    }

    #[test]
    fn test_scan_outputs() {
        let wallet = PrivateAddress::generate();
        let other = PrivateAddress::generate();
        let tx_key = TxKey::generate();

        let (mine0, _) = generate_output_address_with_key(&wallet.public_address(), &tx_key, 0);
        let (theirs, _) = generate_output_address_with_key(&other.public_address(), &tx_key, 1);
        let (mine2, _) = generate_output_address_with_key(&wallet.public_address(), &tx_key, 2);

        let owned = scan_outputs(&wallet, &[mine0, theirs, mine2], 8);

        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].output_index, 0);
        assert_eq!(owned[1].output_index, 2);
        for found in &owned {
            assert_eq!(found.one_time_private_key.public_key(), found.one_time_public_key);
            assert_eq!(found.key_image, derive_key_image(&found.one_time_private_key));
        }
    }
}
