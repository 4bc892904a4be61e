use crate::trapdoor::{message_envelope, KeyMaterial, KeygenLimits, PrimeCachePolicy, PrimeGenerator};
use crate::{CipherError, Decrypt, DefaultRand, Encrypt, Rand, Sign, Verify};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use utils::BigUintExt;

/// What `forward_transform` does with the padding it computes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingMode {
    /// The padding length is computed and random bytes are drawn, then dropped: the raw
    /// message integer is exponentiated.
    #[default]
    Discarded,
    /// `em = 0x00 || 0x02 || ps || 0x00 || msg`, `ps` non-zero random bytes.
    Applied,
}

#[derive(Clone, Debug)]
pub struct ProcessorOptions {
    pub cache: PrimeCachePolicy,
    pub padding: PaddingMode,
    pub prime_test_rounds: usize,
    pub limits: KeygenLimits,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self::reference()
    }
}

impl ProcessorOptions {
    /// Shared prime per bit length, padding discarded.
    pub fn reference() -> Self {
        Self {
            cache: PrimeCachePolicy::PerBitLength,
            padding: PaddingMode::Discarded,
            prime_test_rounds: PrimeGenerator::DEFAULT_TEST_ROUNDS,
            limits: KeygenLimits::default(),
        }
    }

    /// Distinct fresh primes, padding applied.
    pub fn corrected() -> Self {
        Self {
            cache: PrimeCachePolicy::Disabled,
            padding: PaddingMode::Applied,
            ..Self::reference()
        }
    }

    pub fn with_test_rounds(mut self, rounds: usize) -> Self {
        self.prime_test_rounds = rounds;
        self
    }

    pub fn with_limits(mut self, limits: KeygenLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Public/private modular exponentiation over one `KeyMaterial`, with the signature scheme
/// built on the digest envelope.
///
/// Methods take `&self`; the random source sits in a `RefCell`, so a processor is `!Sync`
/// and sharing one between threads takes an outer `Mutex`.
pub struct TrapdoorProcessor<R: Rand = DefaultRand> {
    key: KeyMaterial,
    padding: PaddingMode,
    primes: PrimeGenerator,
    rng: RefCell<R>,
}

impl TrapdoorProcessor<DefaultRand> {
    /// Reference profile backed by OS randomness.
    ///
    /// `bits_len` must be even, at least 16 and a multiple of 8, otherwise `InvalidParameter`.
    pub fn new(bits_len: usize) -> Result<Self, CipherError> {
        Self::with_options(bits_len, ProcessorOptions::reference(), DefaultRand::default())
    }
}

impl<R: Rand> TrapdoorProcessor<R> {
    /// Generates key material under `options`.
    ///
    /// Besides being even and at least 16, `bits_len` has to be a multiple of 8 so every
    /// value below the modulus has a `bits_len / 8` byte encoding. Other lengths such as 18
    /// or 1026 give `InvalidParameter`.
    pub fn with_options(
        bits_len: usize,
        options: ProcessorOptions,
        mut rng: R,
    ) -> Result<Self, CipherError> {
        KeyMaterial::check_bit_length(bits_len)?;

        let mut primes = PrimeGenerator::new(options.cache)
            .with_test_rounds(options.prime_test_rounds)
            .with_limits(options.limits);
        let key = KeyMaterial::generate(bits_len, &mut primes, &mut rng)?;
        log::debug!(
            "trapdoor key ready: {} bits, cache {:?}, padding {:?}",
            bits_len,
            options.cache,
            options.padding
        );

        Ok(Self {
            key,
            padding: options.padding,
            primes,
            rng: RefCell::new(rng),
        })
    }

    /// Wraps existing key material, which is validated first.
    pub fn from_key(key: KeyMaterial, options: ProcessorOptions, rng: R) -> Result<Self, CipherError> {
        key.validate()?;
        let primes = PrimeGenerator::new(options.cache)
            .with_test_rounds(options.prime_test_rounds)
            .with_limits(options.limits);

        Ok(Self {
            key,
            padding: options.padding,
            primes,
            rng: RefCell::new(rng),
        })
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    pub fn padding_mode(&self) -> PaddingMode {
        self.padding
    }

    pub fn prime_generator(&self) -> &PrimeGenerator {
        &self.primes
    }

    /// `k = bits / 8`, length of every encoded value
    pub fn key_len(&self) -> usize {
        self.key.byte_len()
    }

    /// `k - 3`, 0 when the modulus is narrower than 3 bytes
    pub fn max_msg_len(&self) -> usize {
        self.key_len().saturating_sub(3)
    }

    pub(crate) fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.rng.borrow_mut().rand(buf.as_mut_slice());
        buf
    }

    fn to_fixed(&self, x: &BigUint) -> Result<Vec<u8>, CipherError> {
        BigUintExt(x).to_be_bytes_fixed(self.key_len()).ok_or_else(|| {
            CipherError::InvalidKey(format!(
                "value {x:#x} does not fit in {} bytes",
                self.key_len()
            ))
        })
    }

    /// $data^e \mod n$ as `k` big-endian bytes.
    pub fn forward_transform(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let klen = self.key_len();
        let ps_len = match klen.checked_sub(data.len() + 3) {
            Some(ps_len) => ps_len,
            None => {
                return Err(CipherError::MessageTooLong {
                    len: data.len(),
                    max: self.max_msg_len(),
                })
            }
        };

        let m = match self.padding {
            PaddingMode::Discarded => {
                let _padding = self.random_bytes(ps_len);
                BigUint::from_bytes_be(data)
            }
            PaddingMode::Applied => {
                // em = 0x00 || 0x02 || ps || 0x00 || msg
                let mut em = vec![0u8; klen];
                em[1] = 0x02;
                let ps = &mut em[2..(2 + ps_len)];
                let mut rng = self.rng.borrow_mut();
                loop {
                    rng.rand(ps);
                    if !ps.iter().any(|&x| x == 0) {
                        break;
                    }
                }
                em[(3 + ps_len)..].copy_from_slice(data);
                BigUint::from_bytes_be(em.as_slice())
            }
        };

        let c = m.modpow(self.key.public_exponent(), self.key.modulus());
        self.to_fixed(&c)
    }

    /// $encoded^d \mod n$, then everything after the first `0x00` at or after offset 2.
    pub fn reverse_transform(&self, encoded: &[u8]) -> Result<Vec<u8>, CipherError> {
        let c = BigUint::from_bytes_be(encoded);
        let m = c.modpow(self.key.private_exponent(), self.key.modulus());
        let em = self.to_fixed(&m)?;

        let idx = em
            .iter()
            .enumerate()
            .skip(2)
            .find(|x| *x.1 == 0)
            .map(|x| x.0)
            .ok_or_else(|| {
                CipherError::Decoding("no zero delimiter at or after offset 2".to_string())
            })?;

        Ok(em[(idx + 1)..].to_vec())
    }

    /// $envelope(SHA256(msg))^d \mod n$ as `k` big-endian bytes.
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, CipherError> {
        let envelope = message_envelope(msg)?;
        let m = BigUint::from_bytes_be(envelope.as_slice());
        let s = m.modpow(self.key.private_exponent(), self.key.modulus());
        self.to_fixed(&s)
    }

    /// Compares the recovered value, leading zeros stripped, with the expected envelope.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        let s = BigUint::from_bytes_be(signature);
        let m = s.modpow(self.key.public_exponent(), self.key.modulus());
        let (Ok(recovered), Ok(expected)) = (self.to_fixed(&m), message_envelope(msg)) else {
            return false;
        };

        let start = recovered
            .iter()
            .position(|&x| x != 0)
            .unwrap_or(recovered.len());
        recovered[start..] == expected[..]
    }
}

impl<R: Rand> Encrypt for TrapdoorProcessor<R> {
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError> {
        let mut c = self.forward_transform(plaintext)?;
        ciphertext.append(&mut c);
        Ok(())
    }
}

impl<R: Rand> Decrypt for TrapdoorProcessor<R> {
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError> {
        let mut m = self.reverse_transform(ciphertext)?;
        plaintext.append(&mut m);
        Ok(())
    }
}

impl<R: Rand> Sign for TrapdoorProcessor<R> {
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError> {
        let mut s = TrapdoorProcessor::sign(self, msg)?;
        sign.append(&mut s);
        Ok(())
    }
}

impl<R: Rand> Verify for TrapdoorProcessor<R> {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> bool {
        TrapdoorProcessor::verify(self, msg, sign)
    }
}
