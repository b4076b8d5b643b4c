//! Session passphrase gate.
//!
//! Gates the host UI behind a shared passphrase for the lifetime of a
//! session. Comparison is by SHA-256 digest in constant time. This is a
//! lightweight gate for a personal deployment, not an access-control
//! system.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Session-scoped passphrase gate.
pub struct SessionGate {
    expected: [u8; 32],
    unlocked: bool,
}

impl SessionGate {
    /// Create a locked gate expecting the given passphrase.
    pub fn new(passphrase: &str) -> Self {
        Self {
            expected: digest(passphrase),
            unlocked: false,
        }
    }

    /// Attempt to unlock with the supplied passphrase.
    ///
    /// Returns the resulting unlocked state. Once unlocked, the gate
    /// stays open for the rest of the session.
    pub fn try_unlock(&mut self, input: &str) -> bool {
        if bool::from(digest(input).ct_eq(&self.expected)) {
            self.unlocked = true;
        }
        self.unlocked
    }

    /// Whether this session has been unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Re-lock the gate (end of session).
    pub fn lock(&mut self) {
        self.unlocked = false;
    }
}

fn digest(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}
