use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use cipher::trapdoor::{KeygenLimits, ProcessorOptions};
use clap::ValueEnum;
use config::Config;
use serde::{Deserialize, Serialize};

use crate::TrapdoorError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// shared prime per bit length, padding discarded
    #[default]
    #[value(name = "reference")]
    Reference,
    /// distinct primes, padding applied
    #[value(name = "corrected")]
    Corrected,
}

impl Profile {
    pub fn options(self) -> ProcessorOptions {
        match self {
            Self::Reference => ProcessorOptions::reference(),
            Self::Corrected => ProcessorOptions::corrected(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrapdoorConfig {
    // modulus bits
    pub bit_length: usize,

    // Miller-Rabin rounds per candidate
    pub prime_test_rounds: usize,

    pub profile: Profile,

    // candidates per prime before giving up
    pub max_prime_candidates: Option<usize>,

    // milliseconds per prime before giving up
    pub keygen_timeout_ms: Option<u64>,

    // session secret bytes
    pub session_secret_len: usize,
}

impl Default for TrapdoorConfig {
    fn default() -> Self {
        Self {
            bit_length: 2048,
            prime_test_rounds: 5,
            profile: Profile::Reference,
            max_prime_candidates: None,
            keygen_timeout_ms: None,
            session_secret_len: 32,
        }
    }
}

impl TrapdoorConfig {
    pub fn config() -> anyhow::Result<&'static Self> {
        Self::config_with_file(None)
    }

    /// The first call decides the configuration for the rest of the process.
    pub fn config_with_file(f: Option<&Path>) -> anyhow::Result<&'static Self> {
        static CONFIG: OnceLock<TrapdoorConfig> = OnceLock::new();

        if let Some(c) = CONFIG.get() {
            return Ok(c);
        }

        let c = Self::load(f)?;
        Ok(CONFIG.get_or_init(|| c))
    }

    /// defaults, then the file `f`, then `TRAPDOOR__*` environment variables
    pub fn load(f: Option<&Path>) -> anyhow::Result<Self> {
        let default_config = Config::try_from(&TrapdoorConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::from(f).required(true));
        }
        config = config.add_source(
            config::Environment::with_prefix("TRAPDOOR")
                .try_parsing(true)
                .separator("__"),
        );

        let mut tconfig: TrapdoorConfig = config.build()?.try_deserialize()?;
        tconfig.prime_test_rounds = tconfig.prime_test_rounds.max(1);

        if tconfig.session_secret_len == 0 {
            return Err(TrapdoorError::ConfigFailed(
                "`session_secret_len` must be positive".to_string(),
            )
            .into());
        }

        log::trace!("{:?}", tconfig);

        Ok(tconfig)
    }

    pub fn keygen_limits(&self) -> KeygenLimits {
        let mut limits = KeygenLimits::unbounded();
        if let Some(max) = self.max_prime_candidates {
            limits = limits.with_max_candidates(max);
        }
        if let Some(ms) = self.keygen_timeout_ms {
            limits = limits.with_timeout(Duration::from_millis(ms));
        }
        limits
    }

    /// `profile` and `rounds` override the configured values
    pub fn processor_options(
        &self,
        profile: Option<Profile>,
        rounds: Option<usize>,
    ) -> ProcessorOptions {
        profile
            .unwrap_or(self.profile)
            .options()
            .with_test_rounds(rounds.unwrap_or(self.prime_test_rounds).max(1))
            .with_limits(self.keygen_limits())
    }
}

#[cfg(test)]
mod tests {
    use super::{Profile, TrapdoorConfig};
    use cipher::trapdoor::{PaddingMode, PrimeCachePolicy};
    use std::io::Write;

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("trapdoor-config-{}.json", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"{"bit_length": 1024, "profile": "corrected", "max_prime_candidates": 5000}"#,
        )
        .unwrap();
        drop(f);

        let c = TrapdoorConfig::load(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(c.bit_length, 1024);
        assert_eq!(c.profile, Profile::Corrected);
        assert_eq!(c.max_prime_candidates, Some(5000));
        assert_eq!(c.prime_test_rounds, 5);
        assert_eq!(c.session_secret_len, 32);
        assert_eq!(c.keygen_limits().max_candidates, Some(5000));
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("trapdoor-config-does-not-exist.json");
        assert!(TrapdoorConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn profile_options() {
        let c = TrapdoorConfig::default();
        let o = c.processor_options(None, None);
        assert_eq!(o.cache, PrimeCachePolicy::PerBitLength);
        assert_eq!(o.padding, PaddingMode::Discarded);
        assert_eq!(o.prime_test_rounds, 5);

        let o = c.processor_options(Some(Profile::Corrected), Some(0));
        assert_eq!(o.cache, PrimeCachePolicy::Disabled);
        assert_eq!(o.padding, PaddingMode::Applied);
        assert_eq!(o.prime_test_rounds, 1);
    }
}
