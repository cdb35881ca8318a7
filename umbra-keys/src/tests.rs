//! Integration tests for the umbra-keys crate.

use crate::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_crypto::{is_in_prime_subgroup, scalar_mult_base, PrivateKey};

#[test]
fn test_full_transaction_flow() {
    // 1. Recipient generates wallet
    let recipient = PrivateAddress::generate();
    let public = recipient.public_address();

    // 2. Sender derives a one-time output at index 3
    let (output, _) = generate_output_address(&public, 3);

    // 3. Recipient scans for output
    let index = find_output_index(&recipient, &output.ephemeral_pub_key, &output.addressee, 16);
    assert_eq!(index, Some(3), "Recipient should recognize the output");

    // 4. Recipient derives spending key
    let one_time_private = derive_private_key_of_output(&recipient, &output.ephemeral_pub_key, 3);

    // 5. Verify private key matches public key
    assert_eq!(
        scalar_mult_base(one_time_private.as_scalar()),
        output.addressee,
        "Derived private key should match public key"
    );

    // 6. Derive key image for spending
    let key_image = derive_key_image(&one_time_private);
    assert!(is_in_prime_subgroup(&key_image), "Key image should be valid");
}

#[test]
fn test_third_party_cannot_claim_output() {
    let alice = PrivateAddress::generate();
    let bob = PrivateAddress::generate();

    let (output, _) = generate_output_address(&alice.public_address(), 3);

    assert_eq!(
        find_output_index(&bob, &output.ephemeral_pub_key, &output.addressee, 256),
        None
    );

    // Bob's best guess at a spending key does not open Alice's output
    let bob_guess = derive_private_key_of_output(&bob, &output.ephemeral_pub_key, 3);
    assert_ne!(bob_guess.public_key(), output.addressee);
}

#[test]
fn test_view_key_alone_detects_but_cannot_spend() {
    let wallet = PrivateAddress::generate();
    let (output, _) = generate_output_address(&wallet.public_address(), 1);

    // Watch-only wallet: real view key, unrelated spend key
    let watch_only = PrivateAddress::new(PrivateKey::generate(), wallet.private_view.clone());
    let guessed = derive_private_key_of_output(&watch_only, &output.ephemeral_pub_key, 1);

    assert_ne!(guessed.public_key(), output.addressee);
}

#[test]
fn test_multiple_outputs_same_transaction() {
    let wallet = PrivateAddress::generate();
    let tx_key = TxKey::generate();

    let outputs: Vec<StealthOutput> = (0..4u8)
        .map(|i| generate_output_address_with_key(&wallet.public_address(), &tx_key, i).0)
        .collect();

    // All one-time keys should be unique
    for i in 0..outputs.len() {
        for j in (i + 1)..outputs.len() {
            assert_ne!(outputs[i].addressee, outputs[j].addressee);
        }
    }

    let owned = scan_outputs(&wallet, &outputs, 8);
    assert_eq!(owned.len(), 4);

    // Key images are distinct per output
    for i in 0..owned.len() {
        for j in (i + 1)..owned.len() {
            assert_ne!(owned[i].key_image, owned[j].key_image);
        }
    }
}

#[test]
fn test_seeded_output_generation_is_reproducible() {
    let wallet = PrivateAddress::generate_with_rng(&mut StdRng::seed_from_u64(99));
    let public = wallet.public_address();

    let (a, hash_a) = generate_output_address_with_rng(&public, 0, &mut StdRng::seed_from_u64(5));
    let (b, hash_b) = generate_output_address_with_rng(&public, 0, &mut StdRng::seed_from_u64(5));

    assert_eq!(a, b);
    assert_eq!(hash_a, hash_b);
}

#[test]
fn test_public_address_serde_roundtrip() {
    let public = PrivateAddress::generate().public_address();

    let json = serde_json::to_string(&public).unwrap();
    let parsed: PublicAddress = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, public);
}

#[test]
fn test_stealth_output_serde_roundtrip() {
    let wallet = PrivateAddress::generate();
    let (output, _) = generate_output_address(&wallet.public_address(), 9);

    let json = serde_json::to_string(&output).unwrap();
    let parsed: StealthOutput = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, output);
}

#[test]
fn test_address_string_roundtrip_both_networks() {
    let public = PrivateAddress::generate().public_address();

    for network in [Network::Mainnet, Network::Testnet] {
        let encoded = encode_address(&public, network);
        assert_eq!(decode_address_for_network(&encoded, network).unwrap(), public);
    }
}

#[test]
fn test_address_decode_errors() {
    // Not base58 ('0' is outside the alphabet)
    assert!(matches!(
        decode_address("0OIl"),
        Err(KeyError::InvalidBase58(_))
    ));

    // Valid base58, wrong length
    let short = bs58::encode([1u8; 10]).into_string();
    assert_eq!(
        decode_address(&short),
        Err(KeyError::InvalidLength {
            expected: address::ADDRESS_BYTES_LEN,
            actual: 10,
        })
    );
}

#[test]
fn test_address_rejects_undecodable_key() {
    // Roughly half of all y-coordinates have no matching curve point
    let bad_key = (2u8..)
        .map(|y| {
            let mut bytes = [0u8; 32];
            bytes[0] = y;
            bytes
        })
        .find(|bytes| umbra_crypto::decode_point(bytes).is_err())
        .unwrap();

    let mut payload = vec![MAINNET_VERSION];
    payload.extend_from_slice(&bad_key);
    payload.extend_from_slice(&umbra_crypto::encode_point(&PrivateKey::generate().public_key()));

    let encoded = with_checksum(payload);

    assert!(matches!(
        address::address_from_bytes(&encoded),
        Err(KeyError::InvalidKey(_))
    ));
}

#[test]
fn test_address_rejects_small_order_key() {
    // Encoding of (0, -1), the point of order two
    let mut torsion = [0xffu8; 32];
    torsion[0] = 0xec;
    torsion[31] = 0x7f;

    let mut payload = vec![TESTNET_VERSION];
    payload.extend_from_slice(&umbra_crypto::encode_point(&PrivateKey::generate().public_key()));
    payload.extend_from_slice(&torsion);

    assert!(matches!(
        address::address_from_bytes(&with_checksum(payload)),
        Err(KeyError::InvalidKey(_))
    ));
}

fn with_checksum(mut payload: Vec<u8>) -> Vec<u8> {
    use sha2::{Digest, Sha256};
    let checksum = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum[..4]);
    payload
}
