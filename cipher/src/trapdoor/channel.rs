use crate::trapdoor::TrapdoorProcessor;
use crate::{CipherError, DefaultRand, Rand};
use std::collections::HashMap;

#[cfg(feature = "sec-zeroize")]
type SessionSecret = zeroize::Zeroizing<Vec<u8>>;
#[cfg(not(feature = "sec-zeroize"))]
type SessionSecret = Vec<u8>;

/// Local simulation of key establishment between peers over one processor.
///
/// The session table maps a peer id to its raw secret. Entries are overwritten, never
/// removed, and live as long as the channel.
pub struct SecureChannel<R: Rand = DefaultRand> {
    processor: TrapdoorProcessor<R>,
    secret_len: usize,
    sessions: HashMap<String, SessionSecret>,
}

impl SecureChannel<DefaultRand> {
    pub const DEFAULT_MODULUS_BITS: usize = 2048;

    /// 2048-bit processor in the reference profile
    pub fn new() -> Result<Self, CipherError> {
        Ok(Self::with_processor(TrapdoorProcessor::new(
            Self::DEFAULT_MODULUS_BITS,
        )?))
    }
}

impl<R: Rand> SecureChannel<R> {
    pub const DEFAULT_SECRET_LEN: usize = 32;

    pub fn with_processor(processor: TrapdoorProcessor<R>) -> Self {
        Self {
            processor,
            secret_len: Self::DEFAULT_SECRET_LEN,
            sessions: HashMap::new(),
        }
    }

    /// Session secrets longer than `processor.max_msg_len()` make `establish_secure_session`
    /// fail with `MessageTooLong`.
    pub fn with_secret_len(mut self, secret_len: usize) -> Self {
        self.secret_len = secret_len;
        self
    }

    pub fn processor(&self) -> &TrapdoorProcessor<R> {
        &self.processor
    }

    pub fn secret_len(&self) -> usize {
        self.secret_len
    }

    pub fn session_key(&self, peer_id: &str) -> Option<&[u8]> {
        self.sessions.get(peer_id).map(|s| s.as_slice())
    }

    pub fn peers(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(|k| k.as_str())
    }

    /// Draws a fresh secret, stores it under `peer_id` and returns it forward transformed.
    pub fn establish_secure_session(&mut self, peer_id: &str) -> Result<Vec<u8>, CipherError> {
        let secret = SessionSecret::from(self.processor.random_bytes(self.secret_len));
        let protected = self.processor.forward_transform(&secret)?;

        log::debug!("session established for `{peer_id}`");
        self.sessions.insert(peer_id.to_string(), secret);
        Ok(protected)
    }

    /// Recovers a protected secret and stores it under `peer_id`.
    ///
    /// A decoding failure returns false and leaves the session table as it was.
    pub fn decrypt_session_key(&mut self, peer_id: &str, protected: &[u8]) -> bool {
        match self.processor.reverse_transform(protected) {
            Ok(secret) => {
                self.sessions
                    .insert(peer_id.to_string(), SessionSecret::from(secret));
                true
            }
            Err(e) => {
                log::debug!("session key for `{peer_id}` not recovered: {e}");
                false
            }
        }
    }

    /// `(message, signature)`
    pub fn create_signed_message(&self, message: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CipherError> {
        let signature = self.processor.sign(message)?;
        Ok((message.to_vec(), signature))
    }

    pub fn verify_signed_message(&self, message: &[u8], signature: &[u8]) -> bool {
        self.processor.verify(message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::SecureChannel;
    use crate::trapdoor::fixture::key_512;
    use crate::trapdoor::{ProcessorOptions, TrapdoorProcessor};
    use crate::{CipherError, SeededRand};

    fn channel(options: ProcessorOptions) -> SecureChannel<SeededRand> {
        let processor =
            TrapdoorProcessor::from_key(key_512(), options, SeededRand::new(0x5e55)).unwrap();
        SecureChannel::with_processor(processor)
    }

    #[test]
    fn corrected_session_recovery() {
        let mut ch = channel(ProcessorOptions::corrected());
        let protected = ch.establish_secure_session("peer_001").unwrap();
        assert_eq!(protected.len(), 64);

        let secret = ch.session_key("peer_001").unwrap().to_vec();
        assert_eq!(secret.len(), 32);

        assert!(ch.decrypt_session_key("peer_002", &protected));
        assert_eq!(ch.session_key("peer_002"), Some(secret.as_slice()));

        let mut peers = ch.peers().collect::<Vec<_>>();
        peers.sort();
        assert_eq!(peers, vec!["peer_001", "peer_002"]);
    }

    #[test]
    fn reference_session_keeps_zero_prefix() {
        let mut ch = channel(ProcessorOptions::reference());
        let protected = ch.establish_secure_session("peer_001").unwrap();
        let secret = ch.session_key("peer_001").unwrap().to_vec();

        // raw secret under a 64-byte modulus, the delimiter is found at offset 2
        assert!(ch.decrypt_session_key("peer_002", &protected));
        let recovered = ch.session_key("peer_002").unwrap();
        assert_eq!(recovered.len(), 61);
        assert!(recovered[..29].iter().all(|&x| x == 0));
        assert_eq!(&recovered[29..], secret.as_slice());
    }

    #[test]
    fn failed_recovery_leaves_table() {
        let mut ch = channel(ProcessorOptions::reference());
        ch.establish_secure_session("peer_001").unwrap();
        let before = ch.session_key("peer_001").unwrap().to_vec();

        // reverse transforms to 64 bytes of 0x11
        let bad = hex::decode("71691b38184f576738d58510377de4fe46a886ce3ceb4e4d36a79888b7772130900e98289c192352657f99aaff9ba807af0103ad580d1970560791be25abc25c").unwrap();
        assert!(!ch.decrypt_session_key("peer_001", &bad));
        assert!(!ch.decrypt_session_key("peer_003", &bad));

        assert_eq!(ch.session_key("peer_001"), Some(before.as_slice()));
        assert!(ch.session_key("peer_003").is_none());
        assert_eq!(ch.peers().count(), 1);
    }

    #[test]
    fn establish_overwrites() {
        let mut ch = channel(ProcessorOptions::corrected());
        ch.establish_secure_session("peer_001").unwrap();
        let first = ch.session_key("peer_001").unwrap().to_vec();
        ch.establish_secure_session("peer_001").unwrap();
        assert_ne!(ch.session_key("peer_001").unwrap(), first.as_slice());
        assert_eq!(ch.peers().count(), 1);
    }

    #[test]
    fn secret_too_long() {
        let mut ch = channel(ProcessorOptions::corrected()).with_secret_len(62);
        assert_eq!(
            ch.establish_secure_session("peer_001"),
            Err(CipherError::MessageTooLong { len: 62, max: 61 })
        );
        assert!(ch.session_key("peer_001").is_none());
    }

    #[test]
    fn minimum_modulus_session() {
        let processor =
            TrapdoorProcessor::with_options(16, ProcessorOptions::corrected(), SeededRand::new(9))
                .unwrap();
        let mut ch = SecureChannel::with_processor(processor).with_secret_len(0);
        assert_eq!(
            ch.establish_secure_session("peer_001"),
            Err(CipherError::MessageTooLong { len: 0, max: 0 })
        );
        assert_eq!(ch.peers().count(), 0);
    }

    #[test]
    fn signed_message() {
        let ch = channel(ProcessorOptions::corrected());
        let message = b"Important contract requiring mathematical verification";
        let (m, sig) = ch.create_signed_message(message).unwrap();
        assert_eq!(m, message);
        assert!(ch.verify_signed_message(&m, &sig));
        assert!(!ch.verify_signed_message(b"Important contract (modified)", &sig));
    }
}
