use crate::extended_gcd;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// self * inv = 1 \mod modulus
    ///
    /// `inv = ((x mod m) + m) mod m` where `(g, x, _) = extended_gcd(self, m)`,
    /// None if `g != 1`.
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let (a, m) = (BigInt::from(self.deref().clone()), BigInt::from(modulus.clone()));
        let g = extended_gcd(&a, &m);
        if !g.gcd.is_one() {
            return None;
        }

        (((g.x % &m) + &m) % &m).to_biguint()
    }

    // 生成[0..self)之间的随机数
    pub fn gen_random<R: Rand>(&self, rng: &mut R) -> BigUint {
        let bits = self.bits() as usize;
        let mut n = vec![0u8; (bits + 7) >> 3];
        let b = bits & 7;

        loop {
            rng.rand(n.as_mut_slice());
            // 清除大于bits的位, 减少拒绝采样的次数
            if b != 0 {
                if let Some(x) = n.last_mut() {
                    *x &= (1u8 << b) - 1;
                }
            }

            let r = BigUint::from_bytes_le(n.as_slice());
            if self.deref() > &r {
                return r;
            }
        }
    }

    /// Uniform value with exactly `bits_len` bits, the top bit and the lowest bit forced to 1.
    ///
    /// note: `bits_len >= 2`, otherwise the forced bits overlap.
    pub fn random_odd_with_bits<R: Rand>(bits_len: usize, rng: &mut R) -> BigUint {
        let (mut p, b) = (
            vec![0u8; (bits_len + 7) >> 3],
            if (bits_len & 7) == 0 { 8 } else { bits_len & 7 },
        );
        rng.rand(p.as_mut_slice());

        if let Some(x) = p.last_mut() {
            if b != 8 {
                *x &= (1u8 << b) - 1;
            }
            *x |= 1 << (b - 1);
        }

        if let Some(x) = p.first_mut() {
            *x |= 1;
        }

        BigUint::from_bytes_le(p.as_slice())
    }

    /// Cheap rejection before the probabilistic test. True if the value is a multiple of a
    /// prime up to 53 other than that prime itself.
    pub fn has_small_factor(&self) -> bool {
        const PRIMES_A: u32 = 3 * 5 * 7 * 11 * 13 * 17 * 19 * 23 * 37;
        const PRIMES_B: u32 = 29 * 31 * 41 * 43 * 47 * 53;
        const SMALL_PRIMES_A: [u32; 9] = [3, 5, 7, 11, 13, 17, 19, 23, 37];
        const SMALL_PRIMES_B: [u32; 6] = [29, 31, 41, 43, 47, 53];

        if self.is_even() {
            return self.deref() != &BigUint::from(2u8);
        }

        let small = self.to_u32();
        let (ra, rb) = (
            (self.deref() % PRIMES_A).to_u32().unwrap_or_default(),
            (self.deref() % PRIMES_B).to_u32().unwrap_or_default(),
        );

        SMALL_PRIMES_A
            .iter()
            .map(|&p| (p, ra))
            .chain(SMALL_PRIMES_B.iter().map(|&p| (p, rb)))
            .any(|(p, r)| r % p == 0 && small != Some(p))
    }

    /// Miller-Rabin probable prime test with `rounds` random witnesses in `[2, n-2)`.
    ///
    /// For composite `n` the probability of returning true is at most $4^{-rounds}$.
    pub fn probably_prime_test<R: Rand>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        let (two, three) = (BigUint::from(2u8), BigUint::from(3u8));

        if n < &two {
            return false;
        } else if n == &two || n == &three {
            return true;
        } else if n.is_even() {
            return false;
        }

        // n - 1 = d * 2^r
        let n_m1 = n - 1u32;
        let r = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> r;
        // witness = rand[0, n-3) + 2
        let span = BigUintExt(n - 3u32);

        'next_witness: for _ in 0..rounds {
            let w = span.gen_random(rng) + 2u32;
            let mut x = w.modpow(&d, n);
            if x.is_one() || x == n_m1 {
                continue;
            }

            for _ in 1..r {
                x = x.modpow(&two, n);
                if x == n_m1 {
                    continue 'next_witness;
                }
            }

            return false;
        }

        true
    }

    /// Big-endian encoding left-padded with zeros to exactly `len` bytes, None if the value
    /// needs more than `len` bytes.
    pub fn to_be_bytes_fixed(&self, len: usize) -> Option<Vec<u8>> {
        let b = self.to_bytes_be();
        if self.is_zero() {
            return Some(vec![0u8; len]);
        } else if b.len() > len {
            return None;
        }

        let mut out = vec![0u8; len];
        out[(len - b.len())..].copy_from_slice(b.as_slice());
        Some(out)
    }

    pub fn is_perfect_square(&self) -> bool {
        let root = self.sqrt();
        &(&root * &root) == self.deref()
    }
}
