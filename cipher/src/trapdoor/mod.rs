//! Trapdoor modular permutation
//!
//! - 生成两个位长度为`bits/2`的概率素数$p$和$q$, 模数$n=p*q$, 固定宽度$k = bits/8$字节;
//! - $\phi = (p-1)(q-1)$, 公钥指数$e = 65537$, 私钥指数$d$满足$e*d \equiv 1 \mod \phi$;
//!
//! forward: $y = x ^ e \mod n$;
//!
//! reverse: $x = y ^ d \mod n$, 然后从偏移2开始寻找第一个`0x00`, 返回其后的字节;
//!
//! 签名: $s = envelope(SHA256(m)) ^ d \mod n$, 验证: 比较去掉前导零的$s^e \mod n$与envelope;
//!
//! The reference profile keeps one prime per bit length, so both factors are the same prime
//! and $n = p^2$. With $\phi$ computed as $(p-1)^2$ rather than $p(p-1)$ the permutation does
//! not invert on that modulus; `ProcessorOptions::corrected` draws distinct primes and
//! applies the padding instead of discarding it.
//!

mod prime;
pub use prime::{KeygenLimits, PrimeCachePolicy, PrimeGenerator};

mod key;
pub use key::{KeyMaterial, PUBLIC_EXPONENT};

mod envelope;
pub use envelope::{build_digest_envelope, message_envelope, SHA256_OID};

mod processor;
pub use processor::{PaddingMode, ProcessorOptions, TrapdoorProcessor};

mod channel;
pub use channel::SecureChannel;

#[cfg(test)]
pub(crate) mod fixture {
    use super::KeyMaterial;
    use num_bigint::BigUint;
    use num_traits::Num;

    /// 512-bit key with distinct 256-bit factors.
    pub(crate) fn key_512() -> KeyMaterial {
        let (p, q) = (
            BigUint::from_str_radix("98920366548084643601728869055592650835572950932266967461790948584315647051443", 10).unwrap(),
            BigUint::from_str_radix("94560208308847015747498523884063394671606671904944666360068158221458669711639", 10).unwrap(),
        );
        KeyMaterial::from_primes(512, p, q).unwrap()
    }
}
