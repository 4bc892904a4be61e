use crate::{CipherError, Rand};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use utils::BigUintExt;

/// How a `PrimeGenerator` reuses earlier results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimeCachePolicy {
    /// One prime per bit length: a second request at the same length returns the cached
    /// value, so a modulus built from two equal-length primes is a perfect square.
    #[default]
    PerBitLength,
    /// Every request draws a fresh prime.
    Disabled,
}

/// Bounds on the otherwise unbounded prime search.
#[derive(Clone, Debug, Default)]
pub struct KeygenLimits {
    /// maximum number of candidates drawn per prime
    pub max_candidates: Option<usize>,
    /// wall clock budget per prime
    pub timeout: Option<Duration>,
    /// checked between candidates, set it from another thread to abort the search
    pub cancel: Option<Arc<AtomicBool>>,
}

impl KeygenLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = Some(max_candidates);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Probable prime source for key construction.
///
/// The cache lives as long as the generator, which a `TrapdoorProcessor` owns for its whole
/// lifetime. It is not synchronised: sharing a generator across threads needs an outer lock.
#[derive(Clone, Debug)]
pub struct PrimeGenerator {
    policy: PrimeCachePolicy,
    test_rounds: usize,
    limits: KeygenLimits,
    cache: HashMap<usize, BigUint>,
}

impl Default for PrimeGenerator {
    fn default() -> Self {
        Self::new(PrimeCachePolicy::default())
    }
}

impl PrimeGenerator {
    /// false-positive probability per candidate at most $4^{-5}$
    pub const DEFAULT_TEST_ROUNDS: usize = 5;

    pub fn new(policy: PrimeCachePolicy) -> Self {
        Self {
            policy,
            test_rounds: Self::DEFAULT_TEST_ROUNDS,
            limits: KeygenLimits::default(),
            cache: HashMap::new(),
        }
    }

    pub fn with_test_rounds(mut self, test_rounds: usize) -> Self {
        self.test_rounds = test_rounds;
        self
    }

    pub fn with_limits(mut self, limits: KeygenLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn policy(&self) -> PrimeCachePolicy {
        self.policy
    }

    pub fn test_rounds(&self) -> usize {
        self.test_rounds
    }

    pub fn cached(&self, bits_len: usize) -> Option<&BigUint> {
        self.cache.get(&bits_len)
    }

    /// `n`是概率素数, 测试`rounds`轮Miller-Rabin
    pub fn is_probable_prime<R: Rand>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
        BigUintExt(n).probably_prime_test(rounds, rng)
    }

    /// Draws odd `bits_len`-bit candidates with the top bit set until one passes the
    /// probable prime test.
    ///
    /// With `PrimeCachePolicy::PerBitLength` a previous result for the same `bits_len` is
    /// returned unchanged and no randomness is consumed.
    pub fn generate_prime<R: Rand>(
        &mut self,
        bits_len: usize,
        rng: &mut R,
    ) -> Result<BigUint, CipherError> {
        if bits_len < 2 {
            return Err(CipherError::InvalidParameter(format!(
                "prime size must at least 2-bits, got `{bits_len}`"
            )));
        }

        if self.policy == PrimeCachePolicy::PerBitLength {
            if let Some(p) = self.cache.get(&bits_len) {
                log::debug!("prime cache hit for {bits_len} bits");
                return Ok(p.clone());
            }
        }

        let (start, mut candidates) = (Instant::now(), 0usize);
        let prime = loop {
            self.check_limits(bits_len, candidates, start)?;
            candidates += 1;

            let n = BigUintExt::<BigUint>::random_odd_with_bits(bits_len, rng);
            let n = BigUintExt(n);
            if !n.has_small_factor() && n.probably_prime_test(self.test_rounds, rng) {
                break n.0;
            }
        };

        log::debug!(
            "found {bits_len}-bit probable prime after {candidates} candidates in {:?}",
            start.elapsed()
        );

        if self.policy == PrimeCachePolicy::PerBitLength {
            self.cache.insert(bits_len, prime.clone());
        }

        Ok(prime)
    }

    fn check_limits(
        &self,
        bits: usize,
        candidates: usize,
        start: Instant,
    ) -> Result<(), CipherError> {
        if let Some(cancel) = self.limits.cancel.as_ref() {
            if cancel.load(Ordering::Acquire) {
                return Err(CipherError::Cancelled);
            }
        }

        let exhausted = self
            .limits
            .max_candidates
            .is_some_and(|max| candidates >= max)
            || self
                .limits
                .timeout
                .is_some_and(|timeout| start.elapsed() >= timeout);

        if exhausted {
            Err(CipherError::PrimalityTimeout { bits, candidates })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeygenLimits, PrimeCachePolicy, PrimeGenerator};
    use crate::{CipherError, DefaultRand, SeededRand};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn gen_small_prime() {
        let mut rng = DefaultRand::default();
        let mut primes = PrimeGenerator::new(PrimeCachePolicy::Disabled);
        for bits_len in 2..24 {
            let p = primes.generate_prime(bits_len, &mut rng).unwrap();
            assert_eq!(p.bits() as usize, bits_len);
            assert!(p.bit(0), "{p} is even");
            assert!(PrimeGenerator::is_probable_prime(&p, 31, &mut rng));
        }
    }

    #[test]
    fn per_bit_length_cache_aliases() {
        let mut rng = SeededRand::new(11);
        let mut primes = PrimeGenerator::default();
        let a = primes.generate_prime(128, &mut rng).unwrap();
        let b = primes.generate_prime(128, &mut rng).unwrap();
        assert_eq!(a, b, "the cache returns the same prime for the same bit length");
        assert_eq!(primes.cached(128), Some(&a));

        let c = primes.generate_prime(96, &mut rng).unwrap();
        assert_eq!(c.bits(), 96);
        assert_ne!(a, c);
    }

    #[test]
    fn disabled_cache_draws_fresh() {
        let mut rng = SeededRand::new(12);
        let mut primes = PrimeGenerator::new(PrimeCachePolicy::Disabled);
        let a = primes.generate_prime(128, &mut rng).unwrap();
        let b = primes.generate_prime(128, &mut rng).unwrap();
        assert_ne!(a, b);
        assert!(primes.cached(128).is_none());
    }

    #[test]
    fn invalid_bits() {
        let mut rng = SeededRand::default();
        let mut primes = PrimeGenerator::default();
        assert!(matches!(
            primes.generate_prime(1, &mut rng),
            Err(CipherError::InvalidParameter(_))
        ));
    }

    #[test]
    fn candidate_budget() {
        let mut rng = SeededRand::new(3);
        let mut primes = PrimeGenerator::new(PrimeCachePolicy::Disabled)
            .with_limits(KeygenLimits::unbounded().with_max_candidates(0));
        assert_eq!(
            primes.generate_prime(64, &mut rng),
            Err(CipherError::PrimalityTimeout {
                bits: 64,
                candidates: 0
            })
        );

        let mut primes = PrimeGenerator::new(PrimeCachePolicy::Disabled)
            .with_limits(KeygenLimits::unbounded().with_timeout(Duration::ZERO));
        assert!(matches!(
            primes.generate_prime(64, &mut rng),
            Err(CipherError::PrimalityTimeout { bits: 64, .. })
        ));
    }

    #[test]
    fn cancelled() {
        let mut rng = SeededRand::new(4);
        let cancel = Arc::new(AtomicBool::new(true));
        let mut primes = PrimeGenerator::default()
            .with_limits(KeygenLimits::unbounded().with_cancel(cancel));
        assert_eq!(
            primes.generate_prime(512, &mut rng),
            Err(CipherError::Cancelled)
        );
    }
}
