use crate::trapdoor::{PrimeCachePolicy, PrimeGenerator};
use crate::{CipherError, Rand};
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utils::BigUintExt;

/// 公钥指数, 费马素数$F_4$
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Modulus, totient and the exponent pair derived from two probable primes.
///
/// Immutable after construction. Equality of `prime_a` and `prime_b` is possible (and
/// expected under `PrimeCachePolicy::PerBitLength`), see `has_aliased_primes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    modulus_bit_length: usize,
    prime_a: BigUint,
    prime_b: BigUint,
    // n = p * q
    modulus: BigUint,
    // (p-1)(q-1)
    totient: BigUint,
    public_exponent: BigUint,
    // e * d = 1 % totient
    private_exponent: BigUint,
}

impl KeyMaterial {
    /// smallest modulus that still leaves each prime a full byte
    pub const MIN_BIT_LENGTH: usize = 16;

    /// `bits_len` must be even, at least 16, and a whole number of bytes so the fixed-width
    /// encodings of `bits_len / 8` bytes can always hold a value below the modulus.
    pub fn check_bit_length(bits_len: usize) -> Result<(), CipherError> {
        if bits_len < Self::MIN_BIT_LENGTH {
            Err(CipherError::InvalidParameter(format!(
                "modulus bit length `{bits_len}` is less than {}",
                Self::MIN_BIT_LENGTH
            )))
        } else if bits_len & 1 != 0 {
            Err(CipherError::InvalidParameter(format!(
                "modulus bit length `{bits_len}` is not even"
            )))
        } else if bits_len & 7 != 0 {
            Err(CipherError::InvalidParameter(format!(
                "modulus bit length `{bits_len}` is not a multiple of 8"
            )))
        } else {
            Ok(())
        }
    }

    /// Draws both primes from `primes` at `bits_len / 2` bits each.
    ///
    /// Under `PrimeCachePolicy::Disabled` the second prime is redrawn until it differs from
    /// the first. Under `PerBitLength` the cached first prime comes back as the second.
    pub fn generate<R: Rand>(
        bits_len: usize,
        primes: &mut PrimeGenerator,
        rng: &mut R,
    ) -> Result<Self, CipherError> {
        Self::check_bit_length(bits_len)?;

        let half = bits_len >> 1;
        let prime_a = primes.generate_prime(half, rng)?;
        let prime_b = loop {
            let p = primes.generate_prime(half, rng)?;
            if p != prime_a || primes.policy() == PrimeCachePolicy::PerBitLength {
                break p;
            }
            log::debug!("drew the same {half}-bit prime twice, drawing again");
        };

        Self::derive(bits_len, prime_a, prime_b)
    }

    /// Builds key material from known primes, each of exactly `bits_len / 2` bits.
    pub fn from_primes(
        bits_len: usize,
        prime_a: BigUint,
        prime_b: BigUint,
    ) -> Result<Self, CipherError> {
        Self::check_bit_length(bits_len)?;
        let half = (bits_len >> 1) as u64;

        for p in [&prime_a, &prime_b] {
            if p.bits() != half || !p.bit(0) {
                return Err(CipherError::InvalidParameter(format!(
                    "{p:#x} is not an odd {half}-bit value"
                )));
            }
        }

        Self::derive(bits_len, prime_a, prime_b)
    }

    fn derive(bits_len: usize, prime_a: BigUint, prime_b: BigUint) -> Result<Self, CipherError> {
        let modulus = &prime_a * &prime_b;
        let totient = (&prime_a - 1u32) * (&prime_b - 1u32);
        let public_exponent = BigUint::from(PUBLIC_EXPONENT);
        let private_exponent = BigUintExt(&public_exponent)
            .modinv(&totient)
            .ok_or(CipherError::NoInverse)?;

        if prime_a == prime_b {
            log::warn!(
                "both {}-bit factors are the same prime, the modulus is a perfect square",
                bits_len >> 1
            );
        }

        Ok(Self {
            modulus_bit_length: bits_len,
            prime_a,
            prime_b,
            modulus,
            totient,
            public_exponent,
            private_exponent,
        })
    }

    pub fn modulus_bit_length(&self) -> usize {
        self.modulus_bit_length
    }

    /// fixed width of every encoded value
    pub fn byte_len(&self) -> usize {
        self.modulus_bit_length >> 3
    }

    pub fn prime_a(&self) -> &BigUint {
        &self.prime_a
    }

    pub fn prime_b(&self) -> &BigUint {
        &self.prime_b
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn totient(&self) -> &BigUint {
        &self.totient
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.public_exponent
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.private_exponent
    }

    /// true when both factors are the same prime
    pub fn has_aliased_primes(&self) -> bool {
        self.prime_a == self.prime_b
    }

    pub fn is_modulus_square(&self) -> bool {
        BigUintExt(&self.modulus).is_perfect_square()
    }

    /// Re-checks every derived field, for key material read back from storage.
    pub fn validate(&self) -> Result<(), CipherError> {
        Self::check_bit_length(self.modulus_bit_length)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;

        let half = (self.modulus_bit_length >> 1) as u64;
        for p in [&self.prime_a, &self.prime_b] {
            if p.bits() != half || !p.bit(0) {
                return Err(CipherError::InvalidKey(format!(
                    "prime {p:#x} is not an odd {half}-bit value"
                )));
            }
        }

        if self.modulus != &self.prime_a * &self.prime_b {
            return Err(CipherError::InvalidKey("invalid modulus".to_string()));
        }

        if self.totient != (&self.prime_a - 1u32) * (&self.prime_b - 1u32) {
            return Err(CipherError::InvalidKey("invalid totient".to_string()));
        }

        if self.public_exponent != BigUint::from(PUBLIC_EXPONENT) {
            return Err(CipherError::InvalidKey(format!(
                "public exponent {:#x} is not {PUBLIC_EXPONENT:#x}",
                self.public_exponent
            )));
        }

        if !((&self.public_exponent * &self.private_exponent) % &self.totient).is_one() {
            return Err(CipherError::InvalidKey("invalid exponent".to_string()));
        }

        Ok(())
    }
}

impl Display for KeyMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{bits: {}, n: {:#x}, e: {:#x}, d: {:#x}, p: {:#x}, q: {:#x}}}",
            self.modulus_bit_length,
            self.modulus,
            self.public_exponent,
            self.private_exponent,
            self.prime_a,
            self.prime_b
        )
    }
}
