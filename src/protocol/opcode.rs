//! Opcode vocabulary shared by both nodes.

use core::fmt;

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Store the first password (5-symbol payload).
    SetPassword = 0xD3,
    /// Candidate for verification (5-symbol payload).
    SendPassword = 0xD7,
    /// Replace the stored password (5-symbol payload, needs prior verification).
    ChangePassword = 0xC1,
    /// A verdict byte follows.
    SendingStatus = 0xC6,
    /// Receiver is ready for the payload.
    ReadyToReceive = 0xAA,
    /// Start the door sequence.
    OpenDoor = 0xBB,
    PasswordsMatched = 0xE8,
    PasswordsMismatched = 0xE2,
}

impl Opcode {
    pub const ALL: [Self; 8] = [
        Self::SetPassword,
        Self::SendPassword,
        Self::ChangePassword,
        Self::SendingStatus,
        Self::ReadyToReceive,
        Self::OpenDoor,
        Self::PasswordsMatched,
        Self::PasswordsMismatched,
    ];

    /// Opcodes followed by a [`PASSWORD_LEN`](crate::config::PASSWORD_LEN)-byte payload.
    pub fn carries_payload(self) -> bool {
        matches!(
            self,
            Self::SetPassword | Self::SendPassword | Self::ChangePassword
        )
    }

    /// Opcodes the HMI initiates; everything else is a response.
    pub fn is_request(self) -> bool {
        self.carries_payload() || self == Self::OpenDoor
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SetPassword => "SET_PASSWORD",
            Self::SendPassword => "SEND_PASSWORD",
            Self::ChangePassword => "CHANGE_PASSWORD",
            Self::SendingStatus => "SENDING_STATUS",
            Self::ReadyToReceive => "READY_TO_RECEIVE",
            Self::OpenDoor => "OPEN_DOOR",
            Self::PasswordsMatched => "PASSWORDS_ARE_MATCHED",
            Self::PasswordsMismatched => "PASSWORDS_ARE_MISMATCHED",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0xD3 => Ok(Self::SetPassword),
            0xD7 => Ok(Self::SendPassword),
            0xC1 => Ok(Self::ChangePassword),
            0xC6 => Ok(Self::SendingStatus),
            0xAA => Ok(Self::ReadyToReceive),
            0xBB => Ok(Self::OpenDoor),
            0xE8 => Ok(Self::PasswordsMatched),
            0xE2 => Ok(Self::PasswordsMismatched),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
