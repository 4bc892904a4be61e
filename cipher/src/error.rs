use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CipherError {
    /// 不合法的构造参数
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// 公钥指数与totient不互质
    #[error("public exponent has no inverse modulo the totient")]
    NoInverse,

    /// reverse transform没有找到分隔符
    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("no probable prime of {bits} bits found after {candidates} candidates")]
    PrimalityTimeout { bits: usize, candidates: usize },

    #[error("prime generation cancelled")]
    Cancelled,

    #[error("message of {len} bytes exceeds the {max} bytes the modulus can carry")]
    MessageTooLong { len: usize, max: usize },

    /// 单字节长度字段溢出
    #[error("digest envelope of {0} bytes cannot be encoded with single-byte lengths")]
    EnvelopeTooLarge(usize),

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}
