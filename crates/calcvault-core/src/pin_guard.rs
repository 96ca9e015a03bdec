//! Covert PIN trigger
//!
//! The guard shadows digit entry on the calculator keypad with a rolling
//! buffer. It only ever tracks consecutive digit keystrokes; any other edit
//! resets it, so to an observer the PIN is indistinguishable from an
//! ordinary number being typed. A failed probe leaves no trace and there is
//! no lockout or rate limit.

use crate::cipher;
use zeroize::Zeroizing;

/// Unlock event produced when the covert buffer matches the stored PIN.
///
/// This is the sole trigger for leaving calculator mode. The matched PIN is
/// carried along (it keys the vault cipher) and is wiped from memory when
/// the event is dropped.
#[derive(Debug)]
pub struct VaultUnlock {
    pin: Zeroizing<String>,
}

impl VaultUnlock {
    /// The PIN that produced the unlock.
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Take ownership of the PIN, still wrapped for wiping on drop.
    pub fn into_pin(self) -> Zeroizing<String> {
        self.pin
    }
}

/// Rolling digit buffer watching for a PIN entered mid-calculation.
#[derive(Debug, Default)]
pub struct PinGuard {
    buffer: Zeroizing<String>,
    stored_hash: Option<String>,
}

impl PinGuard {
    /// Create a guard checking against `stored_hash` (None until a PIN is
    /// configured; the guard then never fires).
    pub fn new(stored_hash: Option<String>) -> Self {
        Self {
            buffer: Zeroizing::new(String::new()),
            stored_hash,
        }
    }

    /// Replace the stored hash (after PIN setup or change).
    pub fn set_stored_hash(&mut self, hash: Option<String>) {
        self.stored_hash = hash;
    }

    /// Feed one typed digit. Returns the unlock event when the buffer
    /// reaches exactly [`cipher::PIN_LENGTH`] digits and they verify
    /// against the stored hash; the buffer clears either way.
    pub fn on_digit(&mut self, digit: char) -> Option<VaultUnlock> {
        debug_assert!(digit.is_ascii_digit());
        self.buffer.push(digit);
        self.check()
    }

    /// Feed a multi-digit chunk (the `00` key). The length check runs once,
    /// after the whole chunk: a buffer jumping straight past the PIN length
    /// does not evaluate.
    pub fn on_digits(&mut self, digits: &str) -> Option<VaultUnlock> {
        debug_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        self.buffer.push_str(digits);
        self.check()
    }

    /// Any non-digit edit interrupts the run and clears the buffer.
    pub fn on_interruption(&mut self) {
        self.buffer.clear();
    }

    /// The user backspaced over a just-typed digit; keep the covert buffer
    /// consistent with what remains on screen so a PIN can still be
    /// completed after a correction.
    pub fn on_backspace_digit(&mut self) {
        self.buffer.pop();
    }

    fn check(&mut self) -> Option<VaultUnlock> {
        if self.buffer.len() != cipher::PIN_LENGTH {
            return None;
        }
        let attempt = self.buffer.clone();
        self.buffer.clear();
        let stored = self.stored_hash.as_deref()?;
        if cipher::verify_pin(&attempt, stored) {
            Some(VaultUnlock { pin: attempt })
        } else {
            None
        }
    }
}
