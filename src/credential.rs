//! Keypad symbols, typed entries and the stored credential.
//!
//! ```text
//!   Key ──▶ Candidate (≤ 5 digits) ──▶ Payload (5 wire bytes) ──▶ Credential
//!            HMI, transient             on the link               Control, NVS
//! ```
//!
//! Digits travel as ASCII `'0'..='9'`, which never collide with an opcode.

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};

pub use crate::config::PASSWORD_LEN;

/// Pads a short verification entry to the fixed payload length.
/// Not a digit, so a padded payload can never equal a credential.
pub const FILLER: u8 = b'#';

// ---------------------------------------------------------------------------
// Keypad symbols
// ---------------------------------------------------------------------------

/// A decoded keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Decimal digit 0–9.
    Digit(u8),
    /// `=` terminates an entry.
    Enter,
    /// `+` selects "open door" from the main menu.
    OpenDoor,
    /// `-` selects "change password" from the main menu.
    ChangePassword,
    /// `C` discards the current entry.
    Clear,
}

impl Key {
    /// Map a keypad legend to a key.  Unknown legends are ignored.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '=' => Some(Self::Enter),
            '+' => Some(Self::OpenDoor),
            '-' => Some(Self::ChangePassword),
            'C' | 'c' => Some(Self::Clear),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload (wire form)
// ---------------------------------------------------------------------------

/// The five raw symbol bytes that follow a payload-bearing opcode.
///
/// No validation: the Control node must accept anything the link delivers
/// and decide what it means.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Payload(pub [u8; PASSWORD_LEN]);

impl Payload {
    pub fn as_bytes(&self) -> &[u8; PASSWORD_LEN] {
        &self.0
    }

    /// True when every byte is an ASCII digit.
    pub fn is_all_digits(&self) -> bool {
        self.0.iter().all(u8::is_ascii_digit)
    }
}

// Payloads may carry a candidate password; keep them out of logs.
impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(*****)")
    }
}

// ---------------------------------------------------------------------------
// Candidate entry (HMI side)
// ---------------------------------------------------------------------------

/// Digits typed so far, up to [`PASSWORD_LEN`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    digits: Vec<u8, PASSWORD_LEN>,
}

impl Candidate {
    pub const fn new() -> Self {
        Self { digits: Vec::new() }
    }

    /// Append a digit (0–9).  Returns `false` when the entry is full or the
    /// value is not a digit; the entry is unchanged in that case.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        if digit > 9 {
            return false;
        }
        self.digits.push(b'0' + digit).is_ok()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == PASSWORD_LEN
    }

    /// Wire form; a short entry is padded with [`FILLER`].
    pub fn to_payload(&self) -> Payload {
        let mut bytes = [FILLER; PASSWORD_LEN];
        bytes[..self.digits.len()].copy_from_slice(&self.digits);
        Payload(bytes)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidate({} digits)", self.digits.len())
    }
}

// ---------------------------------------------------------------------------
// Credential (Control side)
// ---------------------------------------------------------------------------

/// The single system password: exactly [`PASSWORD_LEN`] ASCII digits.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential([u8; PASSWORD_LEN]);

/// Rejection reason when a payload cannot become a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotDigits;

impl Credential {
    /// Build from a digit string such as `"13579"`.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes: [u8; PASSWORD_LEN] = s.as_bytes().try_into().ok()?;
        Self::try_from(Payload(bytes)).ok()
    }

    pub fn as_bytes(&self) -> &[u8; PASSWORD_LEN] {
        &self.0
    }

    /// Byte-for-byte comparison with a received candidate.
    pub fn matches(&self, payload: &Payload) -> bool {
        self.0 == payload.0
    }
}

impl TryFrom<Payload> for Credential {
    type Error = NotDigits;

    fn try_from(p: Payload) -> Result<Self, Self::Error> {
        if p.is_all_digits() {
            Ok(Self(p.0))
        } else {
            Err(NotDigits)
        }
    }
}

impl From<Credential> for Payload {
    fn from(c: Credential) -> Self {
        Payload(c.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(*****)")
    }
}
