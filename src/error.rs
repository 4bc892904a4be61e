use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TrapdoorError {
    #[error("invalid hex string `{0}`")]
    InvalidHex(String),

    #[error("the key file `{0}` does not hold valid key material: {1}")]
    InvalidKeyFile(String, String),

    #[error("{0}")]
    ConfigFailed(String),
}
