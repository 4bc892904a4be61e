mod euclid;
pub use euclid::{extended_gcd, ExtendedGcd};

mod biguint_ext;
pub use biguint_ext::BigUintExt;
