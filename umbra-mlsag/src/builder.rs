//! Ring construction from a decoy source.
//!
//! The real row sits at the caller-chosen index; every other row is filled
//! with decoys fetched from a [`ChainStore`]. Each fetch names the keys
//! already placed so the store can skip them; a decoy row that still shares
//! any key with a placed row (the real row included) is drawn again.
//!
//! Decoy selection policy belongs to the store. [`InMemoryChainStore`] draws
//! uniformly from the part of a fixed pool not yet in the ring.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore, SeedableRng};
use umbra_crypto::{encode_point, Point, PrivateKey};

use crate::confidential::{Coin, ConfidentialRing, OutputCommitment};
use crate::ring::MAX_RING_WIDTH;
use crate::{MlsagError, Ring};

/// Default number of times a colliding decoy row is drawn again.
pub const DEFAULT_MAX_REDRAWS: usize = 16;

/// Read-only source of decoys.
///
/// Implementations must return exactly `count` items or an error. `exclude`
/// holds the encoded public keys already in the ring; stores should not
/// return them.
pub trait ChainStore {
    /// Fetch `count` decoy one-time public keys.
    fn fetch_decoy_public_keys(
        &self,
        count: usize,
        exclude: &HashSet<[u8; 32]>,
    ) -> Result<Vec<Point>, MlsagError>;

    /// Fetch `count` decoy coins for confidential-asset rings.
    fn fetch_decoy_coins(&self, count: usize, exclude: &HashSet<[u8; 32]>) -> Result<Vec<Coin>, MlsagError>;
}

/// Ring builder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingBuilderConfig {
    /// How many times one decoy row may be redrawn after collisions.
    pub max_redraws: usize,
}

impl Default for RingBuilderConfig {
    fn default() -> Self {
        Self {
            max_redraws: DEFAULT_MAX_REDRAWS,
        }
    }
}

/// Assembles rings around a real row.
pub struct RingBuilder<S: ChainStore> {
    store: S,
    config: RingBuilderConfig,
}

impl<S: ChainStore> RingBuilder<S> {
    /// Create a new ring builder.
    pub fn new(store: S, config: RingBuilderConfig) -> Self {
        Self { store, config }
    }

    /// The decoy source.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build an `n`-row ring whose row `pi` is the public keys of
    /// `private_keys`.
    pub fn new_random_ring(
        &self,
        private_keys: &[PrivateKey],
        n: usize,
        pi: usize,
    ) -> Result<Ring, MlsagError> {
        check_request(private_keys.len(), n, pi)?;

        let real_row: Vec<Point> = private_keys.iter().map(PrivateKey::public_key).collect();
        let rows = self.fill_rows(real_row, n, pi, |p| *p, |count, used| {
            self.store.fetch_decoy_public_keys(count, used)
        })?;

        Ring::new(rows)
    }

    /// Build an `n`-row confidential ring whose row `pi` is `coins`.
    pub fn new_random_confidential_ring(
        &self,
        coins: &[Coin],
        outputs: &[OutputCommitment],
        n: usize,
        pi: usize,
    ) -> Result<ConfidentialRing, MlsagError> {
        check_request(coins.len(), n, pi)?;

        let rows = self.fill_rows(coins.to_vec(), n, pi, |c| c.public_key, |count, used| {
            self.store.fetch_decoy_coins(count, used)
        })?;

        ConfidentialRing::new(rows, outputs.to_vec())
    }

    fn fill_rows<T, K, F>(
        &self,
        real_row: Vec<T>,
        n: usize,
        pi: usize,
        key_of: K,
        fetch: F,
    ) -> Result<Vec<Vec<T>>, MlsagError>
    where
        K: Fn(&T) -> Point,
        F: Fn(usize, &HashSet<[u8; 32]>) -> Result<Vec<T>, MlsagError>,
    {
        let m = real_row.len();
        let mut used: HashSet<[u8; 32]> = real_row.iter().map(|item| encode_point(&key_of(item))).collect();
        let mut decoys: Vec<Vec<T>> = Vec::with_capacity(n - 1);

        for row_index in (0..n).filter(|&i| i != pi) {
            let mut attempt = 0;
            let row = loop {
                log::debug!("fetching {} decoys for ring row {}", m, row_index);
                let candidate = fetch(m, &used)?;

                if candidate.len() != m {
                    return Err(MlsagError::ChainStore(format!(
                        "store returned {} decoys, expected {}",
                        candidate.len(),
                        m
                    )));
                }

                let keys: Vec<[u8; 32]> = candidate.iter().map(|item| encode_point(&key_of(item))).collect();
                if !collides(&keys, &used) {
                    used.extend(keys);
                    break candidate;
                }

                attempt += 1;
                if attempt > self.config.max_redraws {
                    return Err(MlsagError::ChainStore(format!(
                        "ring row {} still collides after {} redraws",
                        row_index, self.config.max_redraws
                    )));
                }
                log::warn!(
                    "decoy row {} collides with an existing ring member, redrawing ({}/{})",
                    row_index, attempt, self.config.max_redraws
                );
            };
            decoys.push(row);
        }

        let mut decoys = decoys.into_iter();
        let mut real_row = Some(real_row);
        (0..n)
            .map(|i| {
                let row = if i == pi { real_row.take() } else { decoys.next() };
                row.ok_or_else(|| MlsagError::ChainStore("ring assembly ran out of rows".into()))
            })
            .collect()
    }
}

fn check_request(m: usize, n: usize, pi: usize) -> Result<(), MlsagError> {
    if m == 0 || m > MAX_RING_WIDTH {
        return Err(MlsagError::SignerMisuse(format!(
            "{} real keys, expected 1..={}",
            m, MAX_RING_WIDTH
        )));
    }
    if pi >= n {
        return Err(MlsagError::SignerMisuse(format!(
            "pi {} out of range for ring of {}",
            pi, n
        )));
    }
    Ok(())
}

fn collides(candidate: &[[u8; 32]], used: &HashSet<[u8; 32]>) -> bool {
    candidate
        .iter()
        .enumerate()
        .any(|(i, key)| used.contains(key) || candidate[..i].contains(key))
}

/// A [`ChainStore`] over fixed pools, drawing uniformly without replacement
/// from the entries whose keys are not excluded.
///
/// A pool of `(n - 1)·m` distinct keys, none of them the signer's, is enough
/// for any `n`-row ring of width `m`.
pub struct InMemoryChainStore<R = StdRng> {
    public_keys: Vec<Point>,
    coins: Vec<Coin>,
    rng: Mutex<R>,
}

impl InMemoryChainStore<StdRng> {
    /// Create a store seeded from the operating system.
    pub fn new(public_keys: Vec<Point>, coins: Vec<Coin>) -> Self {
        Self::with_rng(public_keys, coins, StdRng::from_entropy())
    }
}

impl<R: RngCore + CryptoRng> InMemoryChainStore<R> {
    /// Create a store drawing with `rng`.
    pub fn with_rng(public_keys: Vec<Point>, coins: Vec<Coin>, rng: R) -> Self {
        Self {
            public_keys,
            coins,
            rng: Mutex::new(rng),
        }
    }

    /// Number of pooled public keys.
    pub fn public_key_count(&self) -> usize {
        self.public_keys.len()
    }

    /// Number of pooled coins.
    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    fn draw<T: Copy>(
        &self,
        pool: &[T],
        count: usize,
        exclude: &HashSet<[u8; 32]>,
        key_of: impl Fn(&T) -> Point,
    ) -> Result<Vec<T>, MlsagError> {
        let available: Vec<T> = pool
            .iter()
            .filter(|item| !exclude.contains(&encode_point(&key_of(*item))))
            .copied()
            .collect();

        if available.len() < count {
            return Err(MlsagError::ChainStore(format!(
                "pool holds {} usable decoys, {} requested",
                available.len(),
                count
            )));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| MlsagError::ChainStore("decoy rng lock poisoned".into()))?;

        Ok(available.choose_multiple(&mut *rng, count).copied().collect())
    }
}

impl<R: RngCore + CryptoRng> ChainStore for InMemoryChainStore<R> {
    fn fetch_decoy_public_keys(
        &self,
        count: usize,
        exclude: &HashSet<[u8; 32]>,
    ) -> Result<Vec<Point>, MlsagError> {
        self.draw(&self.public_keys, count, exclude, |p| *p)
    }

    fn fetch_decoy_coins(&self, count: usize, exclude: &HashSet<[u8; 32]>) -> Result<Vec<Coin>, MlsagError> {
        self.draw(&self.coins, count, exclude, |c| c.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use umbra_crypto::random_point;

    fn pool(size: usize, seed: u64) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..size).map(|_| random_point(&mut rng)).collect()
    }

    /// Replays scripted responses, then fails.
    struct ScriptedStore {
        responses: RefCell<Vec<Vec<Point>>>,
    }

    impl ScriptedStore {
        fn new(mut responses: Vec<Vec<Point>>) -> Self {
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
            }
        }
    }

    impl ChainStore for ScriptedStore {
        fn fetch_decoy_public_keys(
            &self,
            _count: usize,
            _exclude: &HashSet<[u8; 32]>,
        ) -> Result<Vec<Point>, MlsagError> {
            self.responses
                .borrow_mut()
                .pop()
                .ok_or_else(|| MlsagError::ChainStore("script exhausted".into()))
        }

        fn fetch_decoy_coins(&self, _count: usize, _exclude: &HashSet<[u8; 32]>) -> Result<Vec<Coin>, MlsagError> {
            Err(MlsagError::ChainStore("no coins".into()))
        }
    }

    #[test]
    fn test_real_row_placed_at_pi() {
        let store = InMemoryChainStore::with_rng(pool(64, 1), vec![], StdRng::seed_from_u64(2));
        let builder = RingBuilder::new(store, RingBuilderConfig::default());
        let keys = vec![PrivateKey::generate(), PrivateKey::generate()];

        let ring = builder.new_random_ring(&keys, 6, 4).unwrap();

        assert_eq!(ring.size(), 6);
        assert_eq!(ring.width(), 2);
        assert_eq!(
            ring.row(4).unwrap(),
            &[keys[0].public_key(), keys[1].public_key()][..]
        );
    }

    #[test]
    fn test_no_key_repeats_across_rows() {
        let store = InMemoryChainStore::with_rng(pool(40, 3), vec![], StdRng::seed_from_u64(4));
        let builder = RingBuilder::new(store, RingBuilderConfig { max_redraws: 64 });
        let keys = vec![PrivateKey::generate(), PrivateKey::generate()];

        let ring = builder.new_random_ring(&keys, 8, 0).unwrap();

        let mut all: Vec<[u8; 32]> = ring.rows().iter().flatten().map(encode_point).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_colliding_row_is_redrawn() {
        let key = PrivateKey::generate();
        let decoys = pool(3, 5);
        let store = ScriptedStore::new(vec![
            vec![key.public_key()], // collides with the real row
            vec![decoys[0]],
            vec![decoys[0]], // collides with the previous decoy row
            vec![decoys[1]],
        ]);
        let builder = RingBuilder::new(store, RingBuilderConfig::default());

        let ring = builder.new_random_ring(&[key.clone()], 3, 1).unwrap();

        assert_eq!(ring.row(0).unwrap(), &[decoys[0]][..]);
        assert_eq!(ring.row(1).unwrap(), &[key.public_key()][..]);
        assert_eq!(ring.row(2).unwrap(), &[decoys[1]][..]);
        assert!(builder.store().responses.borrow().is_empty());
    }

    #[test]
    fn test_redraws_exhausted() {
        let key = PrivateKey::generate();
        let store = ScriptedStore::new(vec![vec![key.public_key()]; 3]);
        let builder = RingBuilder::new(store, RingBuilderConfig { max_redraws: 2 });

        assert!(matches!(
            builder.new_random_ring(&[key], 2, 0),
            Err(MlsagError::ChainStore(_))
        ));
    }

    #[test]
    fn test_short_store_response_rejected() {
        let store = ScriptedStore::new(vec![vec![]]);
        let builder = RingBuilder::new(store, RingBuilderConfig::default());

        assert!(matches!(
            builder.new_random_ring(&[PrivateKey::generate()], 2, 0),
            Err(MlsagError::ChainStore(_))
        ));
    }

    #[test]
    fn test_bad_requests() {
        let store = InMemoryChainStore::with_rng(pool(8, 6), vec![], StdRng::seed_from_u64(7));
        let builder = RingBuilder::new(store, RingBuilderConfig::default());

        assert!(matches!(
            builder.new_random_ring(&[PrivateKey::generate()], 3, 3),
            Err(MlsagError::SignerMisuse(_))
        ));
        assert!(matches!(
            builder.new_random_ring(&[], 3, 0),
            Err(MlsagError::SignerMisuse(_))
        ));
    }

    #[test]
    fn test_pool_too_small() {
        let store = InMemoryChainStore::with_rng(pool(1, 8), vec![], StdRng::seed_from_u64(9));

        assert!(matches!(
            store.fetch_decoy_public_keys(2, &HashSet::new()),
            Err(MlsagError::ChainStore(_))
        ));
    }

    #[test]
    fn test_store_skips_excluded_keys() {
        let keys = pool(5, 10);
        let store = InMemoryChainStore::with_rng(keys.clone(), vec![], StdRng::seed_from_u64(11));
        let exclude: HashSet<[u8; 32]> = keys[..3].iter().map(encode_point).collect();

        let mut drawn = store.fetch_decoy_public_keys(2, &exclude).unwrap();
        drawn.sort_by_key(encode_point);
        let mut rest = keys[3..].to_vec();
        rest.sort_by_key(encode_point);
        assert_eq!(drawn, rest);

        assert!(matches!(
            store.fetch_decoy_public_keys(3, &exclude),
            Err(MlsagError::ChainStore(_))
        ));
    }

    #[test]
    fn test_exactly_full_pool_always_builds() {
        for (m, n) in [(1, 11), (2, 8), (3, 4)] {
            for seed in 0..200u64 {
                let store = InMemoryChainStore::with_rng(
                    pool((n - 1) * m, seed),
                    vec![],
                    StdRng::seed_from_u64(seed),
                );
                let builder = RingBuilder::new(store, RingBuilderConfig::default());
                let keys: Vec<PrivateKey> = (0..m).map(|_| PrivateKey::generate()).collect();

                let ring = builder.new_random_ring(&keys, n, (seed as usize) % n);
                assert!(ring.is_ok(), "m = {}, n = {}, seed {}: {:?}", m, n, seed, ring.err());
            }
        }
    }

    #[test]
    fn test_exactly_full_coin_pool_always_builds() {
        use crate::confidential::{asset_tag_base, CoinOpening};
        use umbra_crypto::random_scalar;

        let mut rng = StdRng::seed_from_u64(12);
        let base = asset_tag_base(b"umb");
        let mut coin = |value: u64, public_key: Point| {
            let opening = CoinOpening::new(value, random_scalar(&mut rng), random_scalar(&mut rng));
            (Coin::commit(&base, &opening, public_key), opening)
        };

        let (real, opening) = coin(5, PrivateKey::generate().public_key());
        let output = OutputCommitment::commit(&base, &opening);
        let decoys: Vec<Coin> = pool(6, 13).into_iter().map(|key| coin(1, key).0).collect();

        for seed in 0..50u64 {
            let store = InMemoryChainStore::with_rng(vec![], decoys.clone(), StdRng::seed_from_u64(seed));
            let builder = RingBuilder::new(store, RingBuilderConfig::default());

            let ring = builder.new_random_confidential_ring(&[real], &[output], 7, 3).unwrap();
            assert_eq!(ring.size(), 7);
        }
    }
}
