//! Tagged protocol messages: one variant per opcode.
//!
//! Encoded form is the opcode followed by the payload, if any:
//! ```text
//! ┌────────┬──────────────────────┐
//! │ opcode │ payload (0 or 5 B)   │
//! └────────┴──────────────────────┘
//! ```
//! On the wire the payload half is held back until the peer has answered
//! `READY_TO_RECEIVE`; see [`Exchange`](super::exchange::Exchange).

use heapless::Vec;

use crate::config::PASSWORD_LEN;
use crate::credential::Payload;
use crate::error::ProtocolError;

use super::opcode::Opcode;

/// Longest encoded message.
pub const MAX_MESSAGE_LEN: usize = 1 + PASSWORD_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    SetPassword(Payload),
    SendPassword(Payload),
    ChangePassword(Payload),
    SendingStatus,
    ReadyToReceive,
    OpenDoor,
    PasswordsMatched,
    PasswordsMismatched,
}

/// Outcome of a verification, or of any request answered through
/// `SENDING_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    Mismatched,
}

impl Verdict {
    pub fn opcode(self) -> Opcode {
        match self {
            Self::Matched => Opcode::PasswordsMatched,
            Self::Mismatched => Opcode::PasswordsMismatched,
        }
    }

    pub fn from_opcode(op: Opcode) -> Option<Self> {
        match op {
            Opcode::PasswordsMatched => Some(Self::Matched),
            Opcode::PasswordsMismatched => Some(Self::Mismatched),
            _ => None,
        }
    }

    pub fn is_match(self) -> bool {
        self == Self::Matched
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched { Self::Matched } else { Self::Mismatched }
    }
}

impl Message {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::SetPassword(_) => Opcode::SetPassword,
            Self::SendPassword(_) => Opcode::SendPassword,
            Self::ChangePassword(_) => Opcode::ChangePassword,
            Self::SendingStatus => Opcode::SendingStatus,
            Self::ReadyToReceive => Opcode::ReadyToReceive,
            Self::OpenDoor => Opcode::OpenDoor,
            Self::PasswordsMatched => Opcode::PasswordsMatched,
            Self::PasswordsMismatched => Opcode::PasswordsMismatched,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::SetPassword(p) | Self::SendPassword(p) | Self::ChangePassword(p) => Some(p),
            _ => None,
        }
    }

    /// Build the message for a payload-less opcode.  `None` for opcodes that
    /// need a payload.
    pub fn bare(op: Opcode) -> Option<Self> {
        match op {
            Opcode::SendingStatus => Some(Self::SendingStatus),
            Opcode::ReadyToReceive => Some(Self::ReadyToReceive),
            Opcode::OpenDoor => Some(Self::OpenDoor),
            Opcode::PasswordsMatched => Some(Self::PasswordsMatched),
            Opcode::PasswordsMismatched => Some(Self::PasswordsMismatched),
            Opcode::SetPassword | Opcode::SendPassword | Opcode::ChangePassword => None,
        }
    }

    /// Attach a payload to a payload-bearing opcode.
    pub fn with_payload(op: Opcode, payload: Payload) -> Option<Self> {
        match op {
            Opcode::SetPassword => Some(Self::SetPassword(payload)),
            Opcode::SendPassword => Some(Self::SendPassword(payload)),
            Opcode::ChangePassword => Some(Self::ChangePassword(payload)),
            _ => None,
        }
    }

    pub fn encode(&self) -> Vec<u8, MAX_MESSAGE_LEN> {
        let mut out = Vec::new();
        // Capacity covers opcode + payload; neither push can fail.
        let _ = out.push(self.opcode() as u8);
        if let Some(p) = self.payload() {
            let _ = out.extend_from_slice(p.as_bytes());
        }
        out
    }

    /// Decode one complete message.  The slice must hold exactly the opcode
    /// and its payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (&first, rest) = bytes.split_first().ok_or(ProtocolError::BadLength {
            opcode: 0,
            len: 0,
        })?;
        let op = Opcode::try_from(first)?;
        let bad_length = ProtocolError::BadLength {
            opcode: first,
            len: bytes.len(),
        };

        if op.carries_payload() {
            let raw: [u8; PASSWORD_LEN] = rest.try_into().map_err(|_| bad_length)?;
            Self::with_payload(op, Payload(raw)).ok_or(bad_length)
        } else if rest.is_empty() {
            Self::bare(op).ok_or(bad_length)
        } else {
            Err(bad_length)
        }
    }
}

impl From<Verdict> for Message {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Matched => Self::PasswordsMatched,
            Verdict::Mismatched => Self::PasswordsMismatched,
        }
    }
}
