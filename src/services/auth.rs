//! Request authorization.
//!
//! A request carries a nonce and `hex(HMAC-SHA256(password, nonce))`. The
//! server accepts each nonce once, in order: after an accepted request the
//! expected nonce advances by one. A client that is out of step is told the
//! expected nonce and signs again, so a captured request cannot be replayed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Result of checking a signed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Signature valid; the nonce has been consumed.
    Accepted,
    /// The nonce is not the expected one, which is carried here.
    StaleNonce(u64),
    /// The nonce matched but the signature did not.
    BadSignature,
}

/// Verifies signed requests against the shared secret.
pub struct Authenticator {
    mac: HmacSha256,
    nonce: Mutex<u64>,
}

impl Authenticator {
    /// Creates an authenticator expecting `initial_nonce` first.
    pub fn new(password: &str, initial_nonce: u64) -> Result<Self> {
        Ok(Self {
            mac: keyed(password)?,
            nonce: Mutex::new(initial_nonce),
        })
    }

    /// Creates an authenticator seeded from the current Unix time.
    ///
    /// The nonce only grows while running and restarts above every value
    /// handed out before a reboot (as long as fewer than one request per
    /// second was accepted).
    pub fn from_clock(password: &str) -> Result<Self> {
        let seed = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        Self::new(password, seed)
    }

    fn nonce(&self) -> MutexGuard<'_, u64> {
        self.nonce.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the nonce the next request must carry.
    #[must_use]
    pub fn expected_nonce(&self) -> u64 {
        *self.nonce()
    }

    /// Computes the signature for `nonce`.
    #[must_use]
    pub fn sign(&self, nonce: u64) -> String {
        hex_digest(self.mac.clone(), nonce.to_string().as_bytes())
    }

    /// Checks a request and consumes its nonce when it is accepted.
    pub fn check(&self, nonce: u64, signature: &str) -> AuthOutcome {
        let mut expected = self.nonce();

        if nonce != *expected {
            debug!("Rejected nonce {} (expected {})", nonce, *expected);
            return AuthOutcome::StaleNonce(*expected);
        }

        let Ok(signature) = hex::decode(signature) else {
            return AuthOutcome::BadSignature;
        };

        let mut mac = self.mac.clone();
        mac.update(nonce.to_string().as_bytes());
        if mac.verify_slice(&signature).is_err() {
            return AuthOutcome::BadSignature;
        }

        *expected = expected.wrapping_add(1);
        AuthOutcome::Accepted
    }
}

/// Computes the signature for `nonce` with `password` as the key.
pub fn signature(password: &str, nonce: u64) -> Result<String> {
    Ok(hex_digest(keyed(password)?, nonce.to_string().as_bytes()))
}

fn keyed(password: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(password.as_bytes()).map_err(|e| anyhow!("Invalid HMAC key: {e}"))
}

fn hex_digest(mut mac: HmacSha256, message: &[u8]) -> String {
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}
