//! Demo configuration.

use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Parse { name: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Demo configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Rows per ring, including the real one.
    pub ring_size: usize,
    /// Outputs received and then spent together (ring width).
    pub inputs: usize,
    /// Public keys (and coins) the in-memory chain holds as decoys.
    pub decoy_pool: usize,
    /// Output indices a recipient tries per transaction.
    pub max_index_guesses: u16,
    /// Concurrent verification tasks.
    pub verify_tasks: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ring_size: 11,
            inputs: 2,
            decoy_pool: 256,
            max_index_guesses: 16,
            verify_tasks: 4,
        }
    }
}

impl DemoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            ring_size: read_var("UMBRA_RING_SIZE", defaults.ring_size)?,
            inputs: read_var("UMBRA_INPUTS", defaults.inputs)?,
            decoy_pool: read_var("UMBRA_DECOY_POOL", defaults.decoy_pool)?,
            max_index_guesses: read_var("UMBRA_MAX_INDEX_GUESSES", defaults.max_index_guesses)?,
            verify_tasks: read_var("UMBRA_VERIFY_TASKS", defaults.verify_tasks)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the values are consistent with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring_size == 0 {
            return Err(ConfigError::Invalid("ring size must be at least 1".to_string()));
        }
        if self.inputs == 0 || self.inputs > 255 {
            return Err(ConfigError::Invalid(format!(
                "inputs must be in 1..=255, got {}",
                self.inputs
            )));
        }
        if usize::from(self.max_index_guesses) < self.inputs {
            return Err(ConfigError::Invalid(format!(
                "{} index guesses cannot find {} outputs",
                self.max_index_guesses, self.inputs
            )));
        }
        // Every decoy key appears at most once per ring, and the store skips
        // keys already placed, so the pool only needs one key per slot
        let needed = (self.ring_size - 1) * self.inputs;
        if self.decoy_pool < needed {
            return Err(ConfigError::Invalid(format!(
                "decoy pool of {} cannot fill {} decoy slots",
                self.decoy_pool, needed
            )));
        }
        if self.verify_tasks == 0 {
            return Err(ConfigError::Invalid("at least one verify task is required".to_string()));
        }
        Ok(())
    }
}

fn read_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DemoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_small_pool() {
        let config = DemoConfig {
            ring_size: 11,
            inputs: 3,
            decoy_pool: 29,
            ..DemoConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_values() {
        for config in [
            DemoConfig { ring_size: 0, ..DemoConfig::default() },
            DemoConfig { inputs: 0, ..DemoConfig::default() },
            DemoConfig { verify_tasks: 0, ..DemoConfig::default() },
            DemoConfig { max_index_guesses: 1, ..DemoConfig::default() },
        ] {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_minimum_pool_builds_rings() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        use umbra_crypto::{random_point, PrivateKey};
        use umbra_mlsag::{InMemoryChainStore, RingBuilder, RingBuilderConfig};

        let config = DemoConfig {
            decoy_pool: (DemoConfig::default().ring_size - 1) * DemoConfig::default().inputs,
            ..DemoConfig::default()
        };
        assert!(config.validate().is_ok());

        let mut rng = StdRng::seed_from_u64(1);
        let pool = (0..config.decoy_pool).map(|_| random_point(&mut rng)).collect();
        let builder = RingBuilder::new(
            InMemoryChainStore::with_rng(pool, vec![], StdRng::seed_from_u64(2)),
            RingBuilderConfig::default(),
        );
        let keys: Vec<PrivateKey> = (0..config.inputs).map(|_| PrivateKey::generate()).collect();

        for pi in 0..config.ring_size {
            let ring = builder.new_random_ring(&keys, config.ring_size, pi).unwrap();
            assert_eq!(ring.size(), config.ring_size);
        }
    }

    #[test]
    fn test_read_var_default_and_parse() {
        assert_eq!(read_var("UMBRA_TEST_UNSET_VARIABLE", 7usize).unwrap(), 7);

        env::set_var("UMBRA_TEST_BAD_VARIABLE", "eleven");
        assert!(matches!(
            read_var("UMBRA_TEST_BAD_VARIABLE", 7usize),
            Err(ConfigError::Parse { .. })
        ));

        env::set_var("UMBRA_TEST_GOOD_VARIABLE", " 12 ");
        assert_eq!(read_var("UMBRA_TEST_GOOD_VARIABLE", 7usize).unwrap(), 12);
    }
}
