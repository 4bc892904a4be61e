use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// $a \cdot x + b \cdot y = gcd$
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedGcd {
    pub gcd: BigInt,
    pub x: BigInt,
    pub y: BigInt,
}

/// Extended Euclid, iterative form of the recursion
///
/// ```text
/// egcd(0, b) = (b, 0, 1)
/// egcd(a, b) = (g, y' - (b / a) * x', x')  where (g, x', y') = egcd(b mod a, a)
/// ```
///
/// Keeps the pair of Bezout coefficients for `a` and `b` at every step instead of
/// back-substituting, so the call depth stays constant for any operand size.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> ExtendedGcd {
    // invariant: r0 = a*s0 + b*t0, r1 = a*s1 + b*t1
    let (mut r0, mut r1) = (a.clone(), b.clone());
    let (mut s0, mut s1) = (BigInt::one(), BigInt::zero());
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());

    while !r0.is_zero() {
        // same floor division and remainder the recursive form uses on (b mod a, a)
        let (q, r) = r1.div_mod_floor(&r0);
        let s = &s1 - &q * &s0;
        let t = &t1 - &q * &t0;
        (r1, s1, t1) = (r0, s0, t0);
        (r0, s0, t0) = (r, s, t);
    }

    ExtendedGcd {
        gcd: r1,
        x: s1,
        y: t1,
    }
}
