//! End-to-end run: receive stealth outputs, spend them in a ring, verify in
//! parallel, then repeat with confidential-asset coins.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use rand::rngs::OsRng;
use rand::Rng;
use umbra_crypto::{encode_point, encode_scalar, hash_message, random_point, random_scalar, Point, PrivateKey};
use umbra_keys::{
    decode_address_for_network, encode_address, generate_output_address_with_key, scan_outputs,
    Network, OwnedOutput, PrivateAddress, TxKey,
};
use umbra_mlsag::{
    asset_tag_base, asset_virtual_key, commitment_virtual_key, sign, sign_confidential_asset,
    verify, verify_confidential_asset, Coin, CoinOpening, ColumnLayout, InMemoryChainStore,
    MlsagSig, OutputCommitment, Ring, RingBuilder, RingBuilderConfig,
};

use crate::config::DemoConfig;
use crate::error::DemoError;

const ASSET_ID: &[u8] = b"umb";

/// Drives the demo and keeps the set of spent key images.
pub struct Demo {
    config: DemoConfig,
    spent: Arc<RwLock<HashSet<[u8; 32]>>>,
}

impl Demo {
    /// Create a new demo instance.
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            spent: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Run every stage in order.
    pub async fn run(&self) -> Result<(), DemoError> {
        let owned = self.receive_outputs()?;
        log::info!("Recipient recovered {} outputs", owned.len());

        self.spend_plain(&owned).await?;
        self.spend_confidential(&owned)?;

        Ok(())
    }

    /// Pay a fresh wallet through its published address and scan the
    /// transaction back.
    fn receive_outputs(&self) -> Result<Vec<OwnedOutput>, DemoError> {
        let wallet = PrivateAddress::generate();
        let encoded = encode_address(&wallet.public_address(), Network::Testnet);
        log::info!("Recipient address: {}", encoded);

        // Sender side: only the string is known
        let recipient = decode_address_for_network(&encoded, Network::Testnet)?;
        let bystander = PrivateAddress::generate().public_address();
        let tx_key = TxKey::generate();

        let mut outputs = Vec::with_capacity(self.config.inputs + 1);
        for index in 0..self.config.inputs {
            let (output, _) = generate_output_address_with_key(&recipient, &tx_key, index as u8);
            outputs.push(output);
        }
        let (foreign, _) = generate_output_address_with_key(&bystander, &tx_key, self.config.inputs as u8);
        outputs.push(foreign);
        log::debug!("Transaction carries {} outputs", outputs.len());

        let owned = scan_outputs(&wallet, &outputs, self.config.max_index_guesses);
        if owned.len() != self.config.inputs {
            return Err(DemoError::MissingOutputs {
                expected: self.config.inputs,
                found: owned.len(),
            });
        }

        Ok(owned)
    }

    /// Sign over a plain ring, verify concurrently, then show that a second
    /// spend of the same outputs is caught by its key images.
    async fn spend_plain(&self, owned: &[OwnedOutput]) -> Result<(), DemoError> {
        let pool: Vec<Point> = (0..self.config.decoy_pool).map(|_| random_point(&mut OsRng)).collect();
        let builder = RingBuilder::new(InMemoryChainStore::new(pool, vec![]), RingBuilderConfig::default());

        let keys: Vec<PrivateKey> = owned.iter().map(|o| o.one_time_private_key.clone()).collect();
        let images: Vec<Point> = owned.iter().map(|o| o.key_image).collect();
        let message = hash_message(b"umbra demo transfer");

        let pi = OsRng.gen_range(0..self.config.ring_size);
        let ring = builder.new_random_ring(&keys, self.config.ring_size, pi)?;
        let sig = sign(&message, &ring, pi, &keys, &images)?;
        let encoded = sig.to_hex()?;
        log::info!(
            "Signed {}x{} ring: {} bytes, c = {}...",
            ring.size(),
            ring.width(),
            encoded.len() / 2,
            challenge_prefix(&sig)
        );

        self.verify_in_parallel(Arc::new(ring), Arc::new(encoded), message).await?;
        self.register_spend(&sig.key_images).await?;

        // Same outputs, new ring and position
        let pi = OsRng.gen_range(0..self.config.ring_size);
        let ring = builder.new_random_ring(&keys, self.config.ring_size, pi)?;
        let replay = sign(&message, &ring, pi, &keys, &images)?;
        if !verify(&replay, &ring, &message)? {
            return Err(DemoError::Rejected("second ring signature".to_string()));
        }

        match self.register_spend(&replay.key_images).await {
            Err(DemoError::DoubleSpend(image)) => {
                log::info!("Second spend rejected: key image {} reused", image);
                Ok(())
            }
            Err(e) => Err(e),
            Ok(()) => Err(DemoError::Rejected("double spend went unnoticed".to_string())),
        }
    }

    /// Decode and verify the same signature from several blocking tasks.
    async fn verify_in_parallel(
        &self,
        ring: Arc<Ring>,
        encoded: Arc<String>,
        message: [u8; 32],
    ) -> Result<(), DemoError> {
        let handles: Vec<_> = (0..self.config.verify_tasks)
            .map(|task| {
                let ring = Arc::clone(&ring);
                let encoded = Arc::clone(&encoded);
                tokio::task::spawn_blocking(move || {
                    let sig = MlsagSig::from_hex(&encoded)?;
                    let valid = verify(&sig, &ring, &message)?;
                    log::debug!("Verification task {} finished: {}", task, valid);
                    Ok::<bool, DemoError>(valid)
                })
            })
            .collect();

        for handle in handles {
            let valid = handle.await.map_err(|e| DemoError::Task(e.to_string()))??;
            if !valid {
                return Err(DemoError::Rejected("ring signature".to_string()));
            }
        }

        log::info!("{} verification tasks accepted the signature", self.config.verify_tasks);
        Ok(())
    }

    /// Record key images, failing on the first one already seen.
    async fn register_spend(&self, key_images: &[Point]) -> Result<(), DemoError> {
        let mut spent = self.spent.write().await;

        let encoded: Vec<[u8; 32]> = key_images.iter().map(encode_point).collect();
        if let Some(reused) = encoded.iter().find(|image| spent.contains(*image)) {
            return Err(DemoError::DoubleSpend(hex::encode(reused)));
        }

        spent.extend(encoded);
        Ok(())
    }

    /// Spend the outputs as confidential coins paying two new outputs.
    fn spend_confidential(&self, owned: &[OwnedOutput]) -> Result<(), DemoError> {
        let base = asset_tag_base(ASSET_ID);

        let inputs: Vec<CoinOpening> = (0..owned.len())
            .map(|i| opening(100 * (i as u64 + 1)))
            .collect();
        let total: u64 = inputs.iter().map(|o| o.value).sum();
        let outputs = vec![opening(total / 3), opening(total - total / 3)];

        let coins: Vec<Coin> = inputs
            .iter()
            .zip(owned)
            .map(|(o, out)| Coin::commit(&base, o, out.one_time_public_key))
            .collect();
        let output_commitments: Vec<OutputCommitment> =
            outputs.iter().map(|o| OutputCommitment::commit(&base, o)).collect();

        let decoys: Vec<Coin> = (0..self.config.decoy_pool)
            .map(|i| Coin::commit(&base, &opening(i as u64), random_point(&mut OsRng)))
            .collect();
        let builder = RingBuilder::new(InMemoryChainStore::new(vec![], decoys), RingBuilderConfig::default());

        let pi = OsRng.gen_range(0..self.config.ring_size);
        let ring = builder.new_random_confidential_ring(&coins, &output_commitments, self.config.ring_size, pi)?;

        let keys: Vec<PrivateKey> = owned.iter().map(|o| o.one_time_private_key.clone()).collect();
        let images: Vec<Point> = owned.iter().map(|o| o.key_image).collect();
        let message = hash_message(b"umbra demo confidential transfer");

        let sig = sign_confidential_asset(
            &message,
            &ring,
            pi,
            &keys,
            &asset_virtual_key(&inputs, &outputs),
            &commitment_virtual_key(&inputs, &outputs),
            &images,
        )?;

        let decoded = MlsagSig::from_hex_with_layout(&sig.to_hex()?, ColumnLayout::ConfidentialAsset)?;
        if !verify_confidential_asset(&decoded, &ring, &message)? {
            return Err(DemoError::Rejected("confidential-asset signature".to_string()));
        }

        log::info!(
            "Confidential transfer of {} units over {} rows verified",
            total,
            ring.size()
        );
        Ok(())
    }
}

fn opening(value: u64) -> CoinOpening {
    CoinOpening::new(value, random_scalar(&mut OsRng), random_scalar(&mut OsRng))
}

/// First 8 bytes of the carried challenge, hex encoded.
fn challenge_prefix(sig: &MlsagSig) -> String {
    let challenge = encode_scalar(&sig.c);
    hex::encode(&challenge[..8])
}
